use serde_json::Value;

/// Result of reading a text column that should hold a JSON array of URLs.
///
/// URLs are only reachable through [`UrlList::into_urls`], which yields
/// nothing for `Empty` and `Malformed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlList {
    Empty,
    Parsed(Vec<String>),
    Malformed(String),
}

impl UrlList {
    pub fn into_urls(self) -> Vec<String> {
        match self {
            UrlList::Parsed(urls) => urls,
            UrlList::Empty | UrlList::Malformed(_) => Vec::new(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, UrlList::Malformed(_))
    }
}

/// Parse-or-empty reading of a JSON URL array. Non-string elements and blank
/// strings are skipped.
pub fn parse_url_list(raw: &str) -> UrlList {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return UrlList::Empty;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Null) => UrlList::Empty,
        Ok(Value::Array(items)) => {
            let urls: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(url) => {
                        let url = url.trim();
                        (!url.is_empty()).then(|| url.to_string())
                    }
                    _ => None,
                })
                .collect();
            if urls.is_empty() {
                UrlList::Empty
            } else {
                UrlList::Parsed(urls)
            }
        }
        Ok(other) => UrlList::Malformed(format!(
            "expected a JSON array, found {}",
            value_kind(&other)
        )),
        Err(err) => UrlList::Malformed(err.to_string()),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

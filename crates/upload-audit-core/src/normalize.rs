use std::path::{Path, PathBuf};

/// A referenced URL that falls under the upload prefix.
///
/// The key is relative to the public root and always `/`-separated, e.g.
/// `uploads/products/a.jpg`, so it compares directly with file keys produced
/// by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReferencedPath {
    key: String,
}

impl ReferencedPath {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn into_key(self) -> String {
        self.key
    }

    pub fn to_absolute(&self, public_root: &Path) -> PathBuf {
        self.key
            .split('/')
            .fold(public_root.to_path_buf(), |path, segment| path.join(segment))
    }
}

/// Maps raw database URLs onto upload-relative keys.
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    prefix: Vec<String>,
}

impl PathNormalizer {
    pub fn new(prefix_segments: Vec<String>) -> Self {
        Self {
            prefix: prefix_segments,
        }
    }

    /// Returns `None` for anything outside the upload prefix: external URLs,
    /// other public paths, and paths with `.`/`..` segments.
    pub fn normalize(&self, raw: &str) -> Option<ReferencedPath> {
        let mut url = raw.trim().replace('\\', "/");
        if let Some(end) = url.find(|c: char| c == '?' || c == '#') {
            url.truncate(end);
        }

        if url.starts_with("//") || url.contains("://") {
            return None;
        }

        let mut segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();
        if segments.first() == Some(&".") {
            segments.remove(0);
        }
        if segments.iter().any(|s| *s == "." || *s == "..") {
            return None;
        }

        if self.prefix.is_empty()
            || segments.len() <= self.prefix.len()
            || !segments.iter().zip(&self.prefix).all(|(s, p)| *s == p.as_str())
        {
            return None;
        }

        Some(ReferencedPath {
            key: segments.join("/"),
        })
    }
}

use super::Catalog;
use crate::config::{ColumnKind, SourceConfig};
use crate::json_list::parse_url_list;
use crate::progress::ProgressReporter;
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SourceStatus {
    /// The query ran. `rows` counts non-empty values, `urls` the URLs they
    /// contributed, `malformed_rows` JSON values that could not be read.
    #[serde(rename_all = "camelCase")]
    Loaded {
        rows: usize,
        urls: usize,
        malformed_rows: usize,
    },
    /// The query failed and the source contributed nothing.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    pub table: String,
    pub column: String,
    pub kind: ColumnKind,
    #[serde(flatten)]
    pub status: SourceStatus,
}

impl SourceOutcome {
    pub fn url_count(&self) -> usize {
        match self.status {
            SourceStatus::Loaded { urls, .. } => urls,
            SourceStatus::Failed { .. } => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, SourceStatus::Failed { .. })
    }
}

#[derive(Debug, Default)]
pub struct UrlCollection {
    /// Deduplicated raw URLs across every source.
    pub urls: BTreeSet<String>,
    pub outcomes: Vec<SourceOutcome>,
}

/// Queries every source on its own. A failing source is logged and recorded
/// as [`SourceStatus::Failed`]; it never stops the others.
pub fn collect_urls(
    catalog: &mut Catalog,
    sources: &[SourceConfig],
    reporter: &dyn ProgressReporter,
) -> UrlCollection {
    reporter.on_collect_start(sources.len());
    let start = Instant::now();

    let mut collection = UrlCollection::default();
    for source in sources {
        let status = match catalog.load_column(&source.table, &source.column) {
            Ok(values) => collect_values(source, values, &mut collection.urls),
            Err(err) => {
                warn!(
                    "Skipping source {}.{}: {}",
                    source.table, source.column, err
                );
                SourceStatus::Failed {
                    error: err.to_string(),
                }
            }
        };

        let outcome = SourceOutcome {
            table: source.table.clone(),
            column: source.column.clone(),
            kind: source.kind,
            status,
        };
        debug!("{}.{}: {:?}", outcome.table, outcome.column, outcome.status);
        reporter.on_source_complete(&outcome);
        collection.outcomes.push(outcome);
    }

    let failed = collection.outcomes.iter().filter(|o| o.is_failed()).count();
    info!(
        "Collected {} distinct URLs from {} sources ({} failed)",
        collection.urls.len(),
        sources.len(),
        failed
    );
    reporter.on_collect_complete(collection.urls.len(), start.elapsed().as_secs_f64());

    collection
}

fn collect_values(
    source: &SourceConfig,
    values: Vec<String>,
    urls: &mut BTreeSet<String>,
) -> SourceStatus {
    let rows = values.len();
    let mut url_count = 0;
    let mut malformed_rows = 0;

    for value in values {
        match source.kind {
            ColumnKind::Scalar => {
                let url = value.trim();
                if !url.is_empty() {
                    urls.insert(url.to_string());
                    url_count += 1;
                }
            }
            ColumnKind::JsonArray => {
                let list = parse_url_list(&value);
                if list.is_malformed() {
                    malformed_rows += 1;
                    debug!(
                        "Unreadable JSON list in {}.{}: {:?}",
                        source.table, source.column, list
                    );
                }
                for url in list.into_urls() {
                    urls.insert(url);
                    url_count += 1;
                }
            }
        }
    }

    SourceStatus::Loaded {
        rows,
        urls: url_count,
        malformed_rows,
    }
}

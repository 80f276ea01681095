pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod json_list;
pub mod normalize;
pub mod progress;
pub mod reconcile;
pub mod report;
pub mod scanner;

pub use catalog::{Catalog, SourceOutcome, SourceStatus, UrlCollection};
pub use config::{AppConfig, ColumnKind, SourceConfig};
pub use engine::AuditEngine;
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use reconcile::ReconciliationResult;
pub use report::AuditReport;

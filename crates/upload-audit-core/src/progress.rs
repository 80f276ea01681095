use crate::catalog::SourceOutcome;
use std::path::Path;

/// Trait for reporting audit progress.
///
/// The CLI implements it with an indicatif spinner. All methods have default
/// no-op implementations.
pub trait ProgressReporter {
    fn on_collect_start(&self, _source_count: usize) {}
    fn on_source_complete(&self, _outcome: &SourceOutcome) {}
    fn on_collect_complete(&self, _url_count: usize, _duration_secs: f64) {}
    fn on_walk_start(&self, _uploads_dir: &Path) {}
    fn on_walk_progress(&self, _files_found: usize) {}
    fn on_walk_complete(&self, _total_files: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

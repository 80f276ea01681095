use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use upload_audit_core::{ProgressReporter, SourceOutcome, SourceStatus};

/// CLI progress reporter drawing an indicatif spinner on stderr.
///
/// - Collect phase: spinner with one line per finished source
/// - Walk phase: spinner counting files found
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn spinner(message: String) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        pb.set_style(style);
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_collect_start(&self, source_count: usize) {
        self.set_bar(Self::spinner(format!(
            "Querying {} sources...",
            source_count
        )));
    }

    fn on_source_complete(&self, outcome: &SourceOutcome) {
        let line = match &outcome.status {
            SourceStatus::Loaded { urls, .. } => format!(
                "  \x1b[32m✓\x1b[0m {}.{}: {} URLs",
                outcome.table, outcome.column, urls
            ),
            SourceStatus::Failed { .. } => format!(
                "  \x1b[33m!\x1b[0m {}.{}: skipped",
                outcome.table, outcome.column
            ),
        };
        self.with_bar(|pb| pb.println(line));
    }

    fn on_collect_complete(&self, url_count: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Collected {} distinct URLs in {:.2}s",
            url_count, duration_secs
        );
    }

    fn on_walk_start(&self, uploads_dir: &Path) {
        self.set_bar(Self::spinner(format!(
            "Scanning {}...",
            uploads_dir.display()
        )));
    }

    fn on_walk_progress(&self, files_found: usize) {
        self.with_bar(|pb| pb.set_message(format!("Scanning... {} files found", files_found)));
    }

    fn on_walk_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} files in {:.2}s",
            total_files, duration_secs
        );
    }
}

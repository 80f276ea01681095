use crate::catalog::SourceOutcome;
use crate::error::Error;
use crate::reconcile::ReconciliationResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCounts {
    #[serde(rename = "referencedURLCount")]
    pub referenced_url_count: usize,
    pub filesystem_file_count: usize,
    pub matched_count: usize,
    pub missing_count: usize,
    pub orphan_count: usize,
    /// URLs outside the upload prefix, left out of the comparison.
    #[serde(rename = "excludedURLCount")]
    pub excluded_url_count: usize,
    /// Distinct raw URLs read from the database.
    #[serde(rename = "rawURLCount")]
    pub raw_url_count: usize,
}

/// The structured document written to stdout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub uploads_root: String,
    pub counts: ReportCounts,
    pub missing: Vec<String>,
    pub orphans_preview: Vec<String>,
    pub orphans_truncated: bool,
    pub sources: Vec<SourceOutcome>,
    #[serde(skip)]
    pub orphans: Vec<String>,
    /// Where each finding lives, or would live, on disk.
    #[serde(skip)]
    pub disk_paths: BTreeMap<String, PathBuf>,
}

impl AuditReport {
    pub fn new(
        uploads_root: &Path,
        result: ReconciliationResult,
        raw_url_count: usize,
        excluded_url_count: usize,
        orphan_preview_limit: usize,
        sources: Vec<SourceOutcome>,
    ) -> Self {
        let (preview, truncated) = result.orphan_preview(orphan_preview_limit);
        let orphans_preview = preview.to_vec();

        AuditReport {
            generated_at: Utc::now(),
            uploads_root: uploads_root.to_string_lossy().into_owned(),
            counts: ReportCounts {
                referenced_url_count: result.referenced_count,
                filesystem_file_count: result.filesystem_count,
                matched_count: result.matched_count,
                missing_count: result.missing_count(),
                orphan_count: result.orphan_count(),
                excluded_url_count,
                raw_url_count,
            },
            missing: result.missing,
            orphans_preview,
            orphans_truncated: truncated,
            sources,
            orphans: result.orphans,
            disk_paths: BTreeMap::new(),
        }
    }

    /// Keeps the disk locations of missing and orphaned keys for the CSV.
    pub fn with_disk_paths(mut self, mut paths: BTreeMap<String, PathBuf>) -> Self {
        paths.retain(|key, _| {
            self.missing.binary_search(key).is_ok() || self.orphans.binary_search(key).is_ok()
        });
        self.disk_paths = paths;
        self
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.sources.iter().filter(|o| o.is_failed())
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, Error> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// One `kind,path,disk_path` row per finding, with every orphan rather
    /// than the preview. `disk_path` is empty when it was never resolved.
    pub fn write_csv(&self, path: &Path) -> Result<usize, Error> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["kind", "path", "disk_path"])?;

        let findings = self
            .missing
            .iter()
            .map(|key| ("missing", key))
            .chain(self.orphans.iter().map(|key| ("orphan", key)));

        let mut rows = 0;
        for (kind, key) in findings {
            let disk_path = self
                .disk_paths
                .get(key)
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            writer.write_record([kind, key.as_str(), disk_path.as_str()])?;
            rows += 1;
        }
        writer.flush()?;
        Ok(rows)
    }
}

use crate::progress::ProgressReporter;
use glob::Pattern;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// A regular file found under the uploads directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileRecord {
    /// Path relative to the public root, `/`-separated.
    pub key: String,
    /// Absolute path on disk.
    pub path: PathBuf,
}

/// Sequential directory traversal of the uploads directory.
///
/// Keys are built as `<prefix segments>/<path relative to the walk root>` so
/// they line up with normalized database references.
pub struct FileCollector {
    key_prefix: Vec<String>,
    ignore_patterns: Vec<Pattern>,
}

impl FileCollector {
    pub fn new(key_prefix: Vec<String>, ignore_globs: &[String]) -> Self {
        let ignore_patterns = ignore_globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();

        Self {
            key_prefix,
            ignore_patterns,
        }
    }

    /// Collects every regular file under `uploads_dir`, sorted by key.
    /// A missing directory yields an empty list.
    pub fn collect(&self, uploads_dir: &Path, reporter: &dyn ProgressReporter) -> Vec<FileRecord> {
        if !uploads_dir.is_dir() {
            debug!(
                "Uploads directory {} does not exist, no files collected",
                uploads_dir.display()
            );
            return Vec::new();
        }

        let root = match fs::canonicalize(uploads_dir) {
            Ok(root) => root,
            Err(err) => {
                warn!("Error canonicalizing {}: {}", uploads_dir.display(), err);
                uploads_dir.to_path_buf()
            }
        };

        let mut files = Vec::new();
        for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), err);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(key) = self.key_for(&root, entry.path()) else {
                continue;
            };

            if self.is_ignored(&key) {
                debug!("Ignoring {}", key);
                continue;
            }

            files.push(FileRecord {
                key,
                path: entry.into_path(),
            });
            reporter.on_walk_progress(files.len());
        }

        files.sort();
        files
    }

    fn key_for(&self, root: &Path, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(root).ok()?;
        let mut segments = self.key_prefix.clone();
        for component in relative.components() {
            match component {
                Component::Normal(name) => segments.push(name.to_string_lossy().into_owned()),
                _ => return None,
            }
        }
        Some(segments.join("/"))
    }

    fn is_ignored(&self, key: &str) -> bool {
        self.ignore_patterns.iter().any(|pattern| pattern.matches(key))
    }
}

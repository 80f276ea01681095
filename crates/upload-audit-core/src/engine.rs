use crate::catalog::{self, Catalog, SourceOutcome};
use crate::config::AppConfig;
use crate::error::Error;
use crate::normalize::PathNormalizer;
use crate::progress::ProgressReporter;
use crate::reconcile::reconcile;
use crate::report::AuditReport;
use crate::scanner::FileCollector;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

pub struct AuditEngine {
    config: AppConfig,
}

impl AuditEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn with_orphan_preview_limit(mut self, limit: usize) -> Self {
        self.config.orphan_preview_limit = limit;
        self
    }

    /// Run the full audit over a connection opened from `database_url`:
    /// 1. Collect referenced URLs from every configured source
    /// 2. Walk the uploads directory
    /// 3. Normalize the URLs and reconcile them with the files on disk
    ///
    /// The connection is released when this returns, on success or error.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<AuditReport, Error> {
        self.config.validate()?;
        let mut catalog = catalog::connect(&self.config.database_url)?;
        info!("Connected to {} catalog", catalog.backend_name());
        self.run_with_catalog(&mut catalog, reporter)
    }

    pub fn run_with_catalog(
        &self,
        catalog: &mut Catalog,
        reporter: &dyn ProgressReporter,
    ) -> Result<AuditReport, Error> {
        self.config.validate()?;

        info!("Collecting referenced URLs...");
        let collection = catalog::collect_urls(catalog, &self.config.sources, reporter);

        let uploads_dir = self.config.uploads_dir();
        info!("Scanning {}...", uploads_dir.display());
        reporter.on_walk_start(&uploads_dir);
        let walk_start = Instant::now();
        let collector =
            FileCollector::new(self.config.prefix_segments(), &self.config.ignore_patterns);
        let files = collector.collect(&uploads_dir, reporter);
        let walk_duration = walk_start.elapsed();
        reporter.on_walk_complete(files.len(), walk_duration.as_secs_f64());
        debug!(
            "Scan completed in {:.2}s, {} files",
            walk_duration.as_secs_f64(),
            files.len()
        );

        let normalizer = PathNormalizer::new(self.config.prefix_segments());
        let public_root = Path::new(&self.config.public_root);
        let mut disk_paths: BTreeMap<String, PathBuf> = BTreeMap::new();
        let mut referenced = BTreeSet::new();
        let mut excluded = 0;
        for url in &collection.urls {
            match normalizer.normalize(url) {
                Some(path) => {
                    disk_paths
                        .entry(path.key().to_string())
                        .or_insert_with(|| path.to_absolute(public_root));
                    referenced.insert(path.into_key());
                }
                None => {
                    debug!("Excluding {} (outside upload prefix)", url);
                    excluded += 1;
                }
            }
        }

        let mut on_disk = BTreeSet::new();
        for file in files {
            on_disk.insert(file.key.clone());
            disk_paths.insert(file.key, file.path);
        }
        let result = reconcile(&referenced, &on_disk);
        info!(
            "{} referenced, {} on disk, {} missing, {} orphaned",
            result.referenced_count,
            result.filesystem_count,
            result.missing_count(),
            result.orphan_count()
        );

        Ok(AuditReport::new(
            &uploads_dir,
            result,
            collection.urls.len(),
            excluded,
            self.config.orphan_preview_limit,
            collection.outcomes,
        )
        .with_disk_paths(disk_paths))
    }

    /// Query every source without touching the filesystem.
    pub fn check_sources(
        &self,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<SourceOutcome>, Error> {
        let mut catalog = catalog::connect(&self.config.database_url)?;
        Ok(catalog::collect_urls(&mut catalog, &self.config.sources, reporter).outcomes)
    }
}

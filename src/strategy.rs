//! npm cache strategy
//!
//! The entry point for both public operations. Construction resolves the
//! project paths and loads the manifest; `new` also makes sure every
//! directory exists, while `open` leaves the disk untouched for planning.
//! `install` and `pack` then scan, plan and execute against those paths.
//! Scans are taken fresh inside every call and passed explicitly to the
//! planner, so nothing carries over between operations.

use crate::cache::executor::remove_archive;
use crate::cache::{
    install_plan, read_installed, reconcile, scan_bucket, scan_installed, ArchiveName, Archiver,
    BatchObserver, BatchReport, Bucket, Executor, ReconciliationPlan, TarGzArchiver,
};
use crate::config::Settings;
use crate::error::{ModcacheError, ModcacheResult};
use crate::project::{Manifest, ProjectLayout};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Result of executing one bucket
#[derive(Debug, Clone, Serialize)]
pub struct BucketRun {
    pub bucket: Bucket,
    pub report: BatchReport,
    /// Archive files the bucket scan left out (malformed or shadowed)
    pub ignored: Vec<String>,
}

/// Result of `install`
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    pub buckets: Vec<BucketRun>,
}

impl InstallReport {
    pub fn extracted(&self) -> usize {
        self.buckets.iter().map(|b| b.report.succeeded()).sum()
    }

    pub fn failed(&self) -> usize {
        self.buckets.iter().map(|b| b.report.failed()).sum()
    }
}

/// Plan for one bucket, computed without executing
#[derive(Debug, Clone, Serialize)]
pub struct BucketPlan {
    pub bucket: Bucket,
    pub plan: ReconciliationPlan,
    /// Archive files the bucket scan left out (malformed or shadowed)
    pub ignored: Vec<String>,
}

/// Result of `pack`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PackReport {
    /// One named module was packed
    Single {
        bucket: Bucket,
        archive: ArchiveName,
        /// Version of a same-name archive that was replaced
        replaced: Option<String>,
    },
    /// Full reconciliation over every active bucket
    Full { buckets: Vec<BucketRun> },
}

/// Orchestrates scanners, planner and executor for one project
pub struct Strategy {
    settings: Settings,
    layout: ProjectLayout,
    manifest: Manifest,
    archiver: Box<dyn Archiver>,
}

impl Strategy {
    /// Open a project with the default `.tgz` archiver, creating the cache
    /// and node_modules directories if missing
    pub async fn new(settings: Settings) -> ModcacheResult<Self> {
        let archiver = TarGzArchiver::new(settings.compression_level);
        Self::with_archiver(settings, Box::new(archiver)).await
    }

    /// Open a project with a custom archive backend, creating directories
    pub async fn with_archiver(
        settings: Settings,
        archiver: Box<dyn Archiver>,
    ) -> ModcacheResult<Self> {
        let strategy = Self::load(settings, archiver).await?;
        strategy.layout.ensure_dirs().await?;
        Ok(strategy)
    }

    /// Open a project without creating anything on disk.
    ///
    /// Enough for `plan`; missing buckets scan as empty.
    pub async fn open(settings: Settings) -> ModcacheResult<Self> {
        let archiver = TarGzArchiver::new(settings.compression_level);
        Self::load(settings, Box::new(archiver)).await
    }

    async fn load(settings: Settings, archiver: Box<dyn Archiver>) -> ModcacheResult<Self> {
        let layout = ProjectLayout::from_settings(&settings);
        let manifest = Manifest::from_file(&layout.manifest).await?;

        debug!(
            "Opened {} ({} dependencies, {} devDependencies, production: {})",
            layout.root.display(),
            manifest.dependencies.len(),
            manifest.dev_dependencies.len(),
            settings.production
        );

        Ok(Self {
            settings,
            layout,
            manifest,
            archiver,
        })
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn is_production(&self) -> bool {
        self.settings.production
    }

    /// Buckets processed in the current mode
    pub fn buckets(&self) -> &'static [Bucket] {
        Bucket::active(self.settings.production)
    }

    fn executor(&self) -> Executor<'_> {
        Executor::new(self.archiver.as_ref())
    }

    /// Extract every cached archive into node_modules
    pub async fn install(&self, observer: &dyn BatchObserver) -> ModcacheResult<InstallReport> {
        let mut report = InstallReport::default();

        for &bucket in self.buckets() {
            let dir = self.layout.bucket_dir(bucket);
            let scan = scan_bucket(dir).await?;
            let plan = install_plan(&scan);

            let run = self
                .executor()
                .run_install(
                    bucket.dir_name(),
                    dir,
                    &self.layout.node_modules,
                    &plan,
                    observer,
                )
                .await;
            report.buckets.push(BucketRun {
                bucket,
                report: run,
                ignored: scan.ignored(),
            });
        }

        info!(
            "Install finished: {} extracted, {} failed",
            report.extracted(),
            report.failed()
        );
        Ok(report)
    }

    /// Pack one declared module, or reconcile the whole cache
    pub async fn pack(
        &self,
        target: Option<&str>,
        observer: &dyn BatchObserver,
    ) -> ModcacheResult<PackReport> {
        match target {
            Some(name) => self.pack_one(name).await,
            None => self.pack_all(observer).await,
        }
    }

    /// Compute the reconciliation plan of every active bucket without
    /// touching the filesystem
    pub async fn plan(&self) -> ModcacheResult<Vec<BucketPlan>> {
        let installed = scan_installed(&self.layout.node_modules).await?;
        let mut plans = Vec::new();
        for &bucket in self.buckets() {
            plans.push(self.plan_bucket(bucket, &installed).await?);
        }
        Ok(plans)
    }

    async fn plan_bucket(
        &self,
        bucket: Bucket,
        installed: &BTreeMap<String, String>,
    ) -> ModcacheResult<BucketPlan> {
        let cached = scan_bucket(self.layout.bucket_dir(bucket)).await?;
        Ok(BucketPlan {
            bucket,
            plan: reconcile(self.manifest.declared(bucket), installed, &cached.archives),
            ignored: cached.ignored(),
        })
    }

    async fn pack_all(&self, observer: &dyn BatchObserver) -> ModcacheResult<PackReport> {
        let installed = scan_installed(&self.layout.node_modules).await?;
        let mut buckets = Vec::new();

        for &bucket in self.buckets() {
            let BucketPlan { plan, ignored, .. } = self.plan_bucket(bucket, &installed).await?;
            if plan.is_noop() {
                debug!("{} is up to date", bucket);
            }

            let report = self
                .executor()
                .run_pack(
                    bucket.dir_name(),
                    self.layout.bucket_dir(bucket),
                    &self.layout.node_modules,
                    &plan,
                    observer,
                )
                .await;
            buckets.push(BucketRun {
                bucket,
                report,
                ignored,
            });
        }

        Ok(PackReport::Full { buckets })
    }

    async fn pack_one(&self, name: &str) -> ModcacheResult<PackReport> {
        let bucket = self
            .manifest
            .bucket_of(name)
            .ok_or_else(|| ModcacheError::UnknownModule(name.to_string()))?;

        let package = read_installed(&self.layout.node_modules, name).await?;
        let dir = self.layout.bucket_dir(bucket);
        let archive = ArchiveName::new(name, &package.version);
        info!("Adding {}", archive.encode()?);

        let cached = scan_bucket(dir).await?;
        let replaced = match cached.archives.get(name) {
            Some(old) if *old != package.version => {
                warn!(
                    "Module {} has changed from {} to {}",
                    name, old, package.version
                );
                remove_archive(dir, &ArchiveName::new(name, old)).await?;
                Some(old.clone())
            }
            _ => None,
        };

        self.executor()
            .pack(name, &package.version, dir, &self.layout.node_modules)
            .await?;

        Ok(PackReport::Single {
            bucket,
            archive,
            replaced,
        })
    }
}

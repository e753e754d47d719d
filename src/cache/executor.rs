//! Plan execution
//!
//! Applies plans one operation at a time. A failing item is recorded and
//! logged, and the queue moves on; a batch only returns once every item has
//! an outcome.

use crate::cache::archive::Archiver;
use crate::cache::naming::ArchiveName;
use crate::cache::plan::{InstallPlan, Operation, ReconciliationPlan};
use crate::error::{ModcacheError, ModcacheResult};
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, warn};

/// Outcome of one item in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum ItemStatus {
    Done,
    Warned,
    Failed(String),
}

/// One item of a batch and how it went
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    /// Human-readable description of the item (`add chalk@5.3.0`)
    pub item: String,
    pub status: ItemStatus,
}

/// Ordered outcomes of an executed plan
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.count(|s| *s == ItemStatus::Done)
    }

    pub fn warned(&self) -> usize {
        self.count(|s| *s == ItemStatus::Warned)
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Failed(_)))
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, pred: impl Fn(&ItemStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Receives progress notifications while a batch runs
pub trait BatchObserver: Send + Sync {
    /// A batch of `total` items is about to run
    fn on_start(&self, _label: &str, _total: usize) {}

    /// One item finished
    fn on_item(&self, _outcome: &ItemOutcome) {}

    /// The batch finished
    fn on_finish(&self, _report: &BatchReport) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Sequential executor over an archive backend
pub struct Executor<'a> {
    archiver: &'a dyn Archiver,
}

impl<'a> Executor<'a> {
    pub fn new(archiver: &'a dyn Archiver) -> Self {
        Self { archiver }
    }

    /// Apply a reconciliation plan to a bucket directory.
    ///
    /// Packages are read from `node_modules/<name>`.
    pub async fn run_pack(
        &self,
        label: &str,
        bucket_dir: &Path,
        node_modules: &Path,
        plan: &ReconciliationPlan,
        observer: &dyn BatchObserver,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        observer.on_start(label, plan.len());

        for op in &plan.operations {
            let status = match self.apply(op, bucket_dir, node_modules).await {
                Ok(status) => status,
                Err(e) => {
                    error!("Failed to {}: {}", op, e);
                    ItemStatus::Failed(e.to_string())
                }
            };
            let outcome = ItemOutcome {
                item: op.to_string(),
                status,
            };
            observer.on_item(&outcome);
            report.outcomes.push(outcome);
        }

        observer.on_finish(&report);
        report
    }

    /// Extract every archive of an install plan into `node_modules`.
    pub async fn run_install(
        &self,
        label: &str,
        bucket_dir: &Path,
        node_modules: &Path,
        plan: &InstallPlan,
        observer: &dyn BatchObserver,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        observer.on_start(label, plan.archives.len());

        for archive in &plan.archives {
            let status = match self.extract(archive, bucket_dir, node_modules).await {
                Ok(()) => ItemStatus::Done,
                Err(e) => {
                    error!("Failed to extract {}: {}", archive, e);
                    ItemStatus::Failed(e.to_string())
                }
            };
            let outcome = ItemOutcome {
                item: format!("extract {}", archive),
                status,
            };
            observer.on_item(&outcome);
            report.outcomes.push(outcome);
        }

        observer.on_finish(&report);
        report
    }

    async fn apply(
        &self,
        op: &Operation,
        bucket_dir: &Path,
        node_modules: &Path,
    ) -> ModcacheResult<ItemStatus> {
        match op {
            Operation::Add { name, version } => {
                info!("Adding {}@{}", name, version);
                self.pack(name, version, bucket_dir, node_modules).await?;
            }
            Operation::Update { name, from, to } => {
                info!("Module {} has changed from {} to {}", name, from, to);
                // The new archive name must be valid before the old one goes
                ArchiveName::new(name, to).encode()?;
                remove_archive(bucket_dir, &ArchiveName::new(name, from)).await?;
                self.pack(name, to, bucket_dir, node_modules).await?;
            }
            Operation::Remove { name, version } => {
                info!(
                    "Module {}@{} is not declared in {}, removing it",
                    name,
                    version,
                    bucket_dir.display()
                );
                remove_archive(bucket_dir, &ArchiveName::new(name, version)).await?;
            }
            Operation::Warn { name } => {
                warn!("{} is declared but not installed", name);
                return Ok(ItemStatus::Warned);
            }
        }
        Ok(ItemStatus::Done)
    }

    /// Compress `node_modules/<name>` into the bucket
    pub async fn pack(
        &self,
        name: &str,
        version: &str,
        bucket_dir: &Path,
        node_modules: &Path,
    ) -> ModcacheResult<()> {
        let dest = bucket_dir.join(ArchiveName::new(name, version).encode()?);
        self.archiver
            .compress(&node_modules.join(name), &dest)
            .await?;
        info!("Packed {}@{}", name, version);
        Ok(())
    }

    async fn extract(
        &self,
        archive: &ArchiveName,
        bucket_dir: &Path,
        node_modules: &Path,
    ) -> ModcacheResult<()> {
        let source = bucket_dir.join(archive.encode()?);
        let target = node_modules.join(&archive.name);
        remove_dir_if_exists(&target).await?;

        if let Err(e) = self.archiver.extract(&source, node_modules).await {
            // Drop whatever was partially unpacked
            let _ = remove_dir_if_exists(&target).await;
            return Err(e);
        }

        info!("Extracted {}", archive);
        Ok(())
    }
}

/// Delete one archive from a bucket
pub async fn remove_archive(bucket_dir: &Path, archive: &ArchiveName) -> ModcacheResult<()> {
    let path = bucket_dir.join(archive.encode()?);
    fs::remove_file(&path)
        .await
        .map_err(|e| ModcacheError::archive("delete", &path, e))
}

async fn remove_dir_if_exists(path: &Path) -> ModcacheResult<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ModcacheError::archive("remove", path, e)),
    }
}

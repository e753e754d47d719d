//! Module cache engine
//!
//! Mirrors installed packages into versioned archives and restores them.
//!
//! # Layout
//!
//! ```text
//! .modules/
//!   dependencies/      <name>-v<version>.tgz
//!   devDependencies/   <name>-v<version>.tgz
//! ```
//!
//! # Pipeline
//!
//! | Stage | Module | Effect |
//! |-------|--------|--------|
//! | scan | `scan`, `installed` | read-only |
//! | plan | `plan` | pure |
//! | execute | `executor`, `archive` | writes |

pub mod archive;
pub mod bucket;
pub mod executor;
pub mod installed;
pub mod naming;
pub mod plan;
pub mod scan;

pub use archive::{Archiver, TarGzArchiver};
pub use bucket::Bucket;
pub use executor::{BatchObserver, BatchReport, Executor, ItemOutcome, ItemStatus, NoopObserver};
pub use installed::{read_installed, scan_installed, InstalledPackage};
pub use naming::ArchiveName;
pub use plan::{install_plan, reconcile, InstallPlan, Operation, PlanSummary, ReconciliationPlan};
pub use scan::{list_archives, scan_bucket, CachedArchive, ScanReport};

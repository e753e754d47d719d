//! Cache directory scanning
//!
//! Reads the archives sitting directly in a bucket directory and decodes
//! their names. Scans are read-only and are taken fresh for every operation.

use crate::cache::naming::{self, ArchiveName};
use crate::error::{ModcacheError, ModcacheResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Result of scanning one bucket directory
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Decoded archives, `name -> version`
    pub archives: BTreeMap<String, String>,
    /// Archive files whose names could not be decoded
    pub malformed: Vec<String>,
    /// Archive files shadowed by a later archive with the same package name
    pub duplicates: Vec<String>,
}

impl ScanReport {
    /// Archive files present in the bucket but left out of `archives`
    pub fn ignored(&self) -> Vec<String> {
        let mut ignored: Vec<String> = self
            .malformed
            .iter()
            .chain(&self.duplicates)
            .cloned()
            .collect();
        ignored.sort();
        ignored
    }
}

/// A cached archive with its on-disk metadata
#[derive(Debug, Clone, Serialize)]
pub struct CachedArchive {
    pub name: String,
    pub version: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// List archive filenames directly under `dir`, sorted.
///
/// A bucket directory that does not exist yet holds no archives.
async fn archive_filenames(dir: &Path) -> ModcacheResult<Vec<String>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(ModcacheError::io(
                format!("listing cache directory {}", dir.display()),
                e,
            ))
        }
    };

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ModcacheError::io(format!("listing cache directory {}", dir.display()), e))?
    {
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        // Hidden files are in-progress writes
        if !is_file || name.starts_with('.') || !naming::is_archive(&name) {
            continue;
        }
        names.push(name);
    }

    names.sort();
    Ok(names)
}

/// Scan a bucket directory into a `name -> version` mapping.
///
/// Malformed names are left out of the mapping. When two archives decode to
/// the same package name, the later filename in sorted order wins. A missing
/// directory scans as empty.
pub async fn scan_bucket(dir: &Path) -> ModcacheResult<ScanReport> {
    let mut report = ScanReport::default();
    let mut sources: BTreeMap<String, String> = BTreeMap::new();

    for filename in archive_filenames(dir).await? {
        match ArchiveName::decode(&filename) {
            Ok(archive) => {
                report
                    .archives
                    .insert(archive.name.clone(), archive.version.clone());
                if let Some(previous) = sources.insert(archive.name.clone(), filename.clone()) {
                    warn!(
                        "Duplicate archives for {} in {}: {} shadowed by {}",
                        archive.name,
                        dir.display(),
                        previous,
                        filename
                    );
                    report.duplicates.push(previous);
                }
            }
            Err(e) => {
                warn!("Skipping {}", e);
                report.malformed.push(filename);
            }
        }
    }

    debug!(
        "Scanned {}: {} archive(s), {} malformed",
        dir.display(),
        report.archives.len(),
        report.malformed.len()
    );
    Ok(report)
}

/// List every decodable archive in a bucket with size and modification time
pub async fn list_archives(dir: &Path) -> ModcacheResult<Vec<CachedArchive>> {
    let mut archives = Vec::new();

    for filename in archive_filenames(dir).await? {
        let Ok(archive) = ArchiveName::decode(&filename) else {
            continue;
        };
        let path = dir.join(&filename);
        let meta = fs::metadata(&path)
            .await
            .map_err(|e| ModcacheError::io(format!("reading metadata of {}", path.display()), e))?;

        archives.push(CachedArchive {
            name: archive.name,
            version: archive.version,
            size_bytes: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
            path,
        });
    }

    Ok(archives)
}

//! Archive compress/extract primitives
//!
//! Archives are gzip-compressed tarballs whose entries live under a single
//! top-level directory named after the packed directory, so extracting into
//! `node_modules` recreates `node_modules/<name>`.

use crate::error::{ModcacheError, ModcacheResult};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tar::{Archive, Builder};
use tracing::debug;

/// Abstract archive backend
///
/// The executor only needs these two capabilities, which keeps it testable
/// with fakes that fail on demand.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Pack `source_dir` into the archive file `dest`
    async fn compress(&self, source_dir: &Path, dest: &Path) -> ModcacheResult<()>;

    /// Unpack the archive file `archive` into `dest_dir`
    async fn extract(&self, archive: &Path, dest_dir: &Path) -> ModcacheResult<()>;
}

/// `.tgz` archiver backed by `tar` and `flate2`
#[derive(Debug, Clone, Copy)]
pub struct TarGzArchiver {
    level: u32,
}

impl TarGzArchiver {
    /// Create an archiver with a gzip level (0-9, clamped)
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }
}

impl Default for TarGzArchiver {
    fn default() -> Self {
        Self::new(Compression::default().level())
    }
}

#[async_trait]
impl Archiver for TarGzArchiver {
    async fn compress(&self, source_dir: &Path, dest: &Path) -> ModcacheResult<()> {
        let source_dir = source_dir.to_path_buf();
        let dest = dest.to_path_buf();
        let level = self.level;

        tokio::task::spawn_blocking(move || compress_atomic(&source_dir, &dest, level))
            .await
            .map_err(|e| ModcacheError::Internal(format!("compress task failed: {}", e)))?
    }

    async fn extract(&self, archive: &Path, dest_dir: &Path) -> ModcacheResult<()> {
        let archive = archive.to_path_buf();
        let dest_dir = dest_dir.to_path_buf();

        tokio::task::spawn_blocking(move || extract_tgz(&archive, &dest_dir))
            .await
            .map_err(|e| ModcacheError::Internal(format!("extract task failed: {}", e)))?
    }
}

/// Hidden sibling path used while an archive is being written
fn temp_path(dest: &Path) -> PathBuf {
    let filename = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{}.tmp-{}", filename, std::process::id()))
}

/// Write the archive next to `dest` and rename it into place when complete.
fn compress_atomic(source_dir: &Path, dest: &Path, level: u32) -> ModcacheResult<()> {
    if !source_dir.is_dir() {
        return Err(ModcacheError::archive(
            "compress",
            source_dir,
            "source is not a directory",
        ));
    }

    let top = source_dir
        .file_name()
        .ok_or_else(|| ModcacheError::archive("compress", source_dir, "source has no name"))?
        .to_os_string();

    let temp = temp_path(dest);
    let result = write_tgz(source_dir, Path::new(&top), &temp, level)
        .and_then(|()| fs::rename(&temp, dest));

    if let Err(e) = result {
        let _ = fs::remove_file(&temp);
        return Err(ModcacheError::archive("compress", dest, e));
    }

    debug!("Compressed {} -> {}", source_dir.display(), dest.display());
    Ok(())
}

fn write_tgz(source_dir: &Path, top: &Path, out: &Path, level: u32) -> std::io::Result<()> {
    let file = File::create(out)?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::new(level));

    let mut builder = Builder::new(encoder);
    builder.follow_symlinks(false);
    builder.append_dir_all(top, source_dir)?;

    let mut writer = builder.into_inner()?.finish()?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

fn extract_tgz(archive_path: &Path, dest_dir: &Path) -> ModcacheResult<()> {
    let fail = |reason: String| ModcacheError::archive("extract", archive_path, reason);

    let file = File::open(archive_path).map_err(|e| fail(e.to_string()))?;
    fs::create_dir_all(dest_dir).map_err(|e| fail(e.to_string()))?;

    let mut archive = Archive::new(GzDecoder::new(BufReader::new(file)));
    archive.set_preserve_permissions(true);

    for entry in archive
        .entries()
        .map_err(|e| fail(format!("failed to read entries: {}", e)))?
    {
        let mut entry = entry.map_err(|e| fail(format!("failed to read entry: {}", e)))?;

        let path = entry
            .path()
            .map_err(|e| fail(format!("failed to read entry path: {}", e)))?
            .into_owned();

        if path.is_absolute() {
            return Err(fail(format!("absolute path {}", path.display())));
        }
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(fail(format!("path traversal {}", path.display())));
        }

        let unpacked = entry
            .unpack_in(dest_dir)
            .map_err(|e| fail(format!("failed to unpack {}: {}", path.display(), e)))?;
        if !unpacked {
            return Err(fail(format!("entry escapes destination: {}", path.display())));
        }
    }

    debug!("Extracted {} -> {}", archive_path.display(), dest_dir.display());
    Ok(())
}

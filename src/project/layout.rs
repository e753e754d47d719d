//! Canonical project paths

use crate::cache::Bucket;
use crate::config::Settings;
use crate::error::{ModcacheError, ModcacheResult};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Paths derived from a project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub manifest: PathBuf,
    pub cache_root: PathBuf,
    pub dependencies: PathBuf,
    pub dev_dependencies: PathBuf,
    pub node_modules: PathBuf,
}

impl ProjectLayout {
    pub fn from_settings(settings: &Settings) -> Self {
        let root = settings.cwd.clone();
        let cache_root = root.join(&settings.cache_dir);
        Self {
            manifest: root.join(&settings.manifest),
            dependencies: cache_root.join(Bucket::Dependencies.dir_name()),
            dev_dependencies: cache_root.join(Bucket::DevDependencies.dir_name()),
            node_modules: root.join(&settings.node_modules),
            cache_root,
            root,
        }
    }

    /// Cache subdirectory for a bucket
    pub fn bucket_dir(&self, bucket: Bucket) -> &Path {
        match bucket {
            Bucket::Dependencies => &self.dependencies,
            Bucket::DevDependencies => &self.dev_dependencies,
        }
    }

    /// Create the cache root, both buckets and node_modules if missing
    pub async fn ensure_dirs(&self) -> ModcacheResult<()> {
        for dir in [
            &self.cache_root,
            &self.dependencies,
            &self.dev_dependencies,
            &self.node_modules,
        ] {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| ModcacheError::io(format!("creating directory {}", dir.display()), e))?;
        }
        Ok(())
    }
}

//! Project manifest (`package.json`) parsing

use crate::cache::Bucket;
use crate::error::{ModcacheError, ModcacheResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Declared dependencies of a project
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    /// Package name, if the project has one
    #[serde(default)]
    pub name: Option<String>,

    /// Runtime dependencies, name -> version spec
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    /// Development dependencies, name -> version spec
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl Manifest {
    /// Read and validate a manifest from disk
    pub async fn from_file(path: &Path) -> ModcacheResult<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ModcacheError::ConfigNotFound(path.to_path_buf()))
            }
            Err(e) => {
                return Err(ModcacheError::ConfigInvalid {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        Self::parse(&content).map_err(|reason| ModcacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse manifest JSON and check that no name is declared twice
    pub fn parse(content: &str) -> Result<Self, String> {
        let manifest: Self = serde_json::from_str(content).map_err(|e| e.to_string())?;

        let conflicts: Vec<&str> = manifest
            .dependencies
            .keys()
            .filter(|name| manifest.dev_dependencies.contains_key(*name))
            .map(String::as_str)
            .collect();

        if !conflicts.is_empty() {
            return Err(format!(
                "declared in both dependencies and devDependencies: {}",
                conflicts.join(", ")
            ));
        }

        Ok(manifest)
    }

    /// Declared mapping for a bucket
    pub fn declared(&self, bucket: Bucket) -> &BTreeMap<String, String> {
        match bucket {
            Bucket::Dependencies => &self.dependencies,
            Bucket::DevDependencies => &self.dev_dependencies,
        }
    }

    /// The bucket declaring `name`, if any
    pub fn bucket_of(&self, name: &str) -> Option<Bucket> {
        if self.dependencies.contains_key(name) {
            Some(Bucket::Dependencies)
        } else if self.dev_dependencies.contains_key(name) {
            Some(Bucket::DevDependencies)
        } else {
            None
        }
    }
}

//! Installed package discovery
//!
//! Reads the `package.json` of each package materialized in `node_modules`.

use crate::error::{ModcacheError, ModcacheResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Descriptor file inside every installed package
pub const DESCRIPTOR: &str = "package.json";

/// The fields of an installed package's descriptor that matter here
#[derive(Debug, Clone, Deserialize)]
struct PackageDescriptor {
    name: Option<String>,
    version: Option<String>,
}

/// A package present in the installed-modules directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    /// Directory holding the package
    pub path: PathBuf,
}

/// Read the descriptor of one package directory
async fn read_descriptor(dir: &Path) -> Result<PackageDescriptor, String> {
    let path = dir.join(DESCRIPTOR);
    let content = fs::read_to_string(&path)
        .await
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("cannot parse {}: {}", path.display(), e))
}

/// Scan `node_modules` for installed packages, `name -> version`.
///
/// Only immediate subdirectories, or symlinks to directories, are considered.
/// Entries without a readable descriptor carrying both `name` and `version`
/// are skipped. A missing `node_modules` yields an empty set.
pub async fn scan_installed(node_modules: &Path) -> ModcacheResult<BTreeMap<String, String>> {
    let mut installed = BTreeMap::new();

    let mut entries = match fs::read_dir(node_modules).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(installed),
        Err(e) => {
            return Err(ModcacheError::io(
                format!("listing {}", node_modules.display()),
                e,
            ))
        }
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ModcacheError::io(format!("listing {}", node_modules.display()), e))?
    {
        // Linked and workspace packages are symlinks
        if !fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            continue;
        }

        match read_descriptor(&entry.path()).await {
            Ok(PackageDescriptor {
                name: Some(name),
                version: Some(version),
            }) => {
                installed.insert(name, version);
            }
            Ok(_) => debug!(
                "Skipping {}: descriptor lacks name or version",
                entry.path().display()
            ),
            Err(reason) => debug!("Skipping {}: {}", entry.path().display(), reason),
        }
    }

    debug!(
        "Found {} installed package(s) in {}",
        installed.len(),
        node_modules.display()
    );
    Ok(installed)
}

/// Read one installed package, failing if it is not usable.
pub async fn read_installed(node_modules: &Path, name: &str) -> ModcacheResult<InstalledPackage> {
    let path = node_modules.join(name);
    let descriptor = read_descriptor(&path)
        .await
        .map_err(|reason| ModcacheError::PackageNotInstalled {
            name: name.to_string(),
            reason,
        })?;

    let version = descriptor
        .version
        .ok_or_else(|| ModcacheError::PackageNotInstalled {
            name: name.to_string(),
            reason: format!("{} has no version", path.join(DESCRIPTOR).display()),
        })?;

    Ok(InstalledPackage {
        name: descriptor.name.unwrap_or_else(|| name.to_string()),
        version,
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn install(root: &Path, dir: &str, descriptor: &str) {
        let pkg = root.join(dir);
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(pkg.join(DESCRIPTOR), descriptor).unwrap();
    }

    #[tokio::test]
    async fn scan_reads_descriptors() {
        let dir = TempDir::new().unwrap();
        install(dir.path(), "lodash", r#"{"name": "lodash", "version": "4.17.21"}"#);
        install(dir.path(), "chalk", r#"{"name": "chalk", "version": "5.3.0"}"#);

        let installed = scan_installed(dir.path()).await.unwrap();

        assert_eq!(installed.len(), 2);
        assert_eq!(installed["lodash"], "4.17.21");
        assert_eq!(installed["chalk"], "5.3.0");
    }

    #[tokio::test]
    async fn scan_skips_unreadable_entries() {
        let dir = TempDir::new().unwrap();
        install(dir.path(), "good", r#"{"name": "good", "version": "1.0.0"}"#);
        install(dir.path(), "broken", "{ not json");
        install(dir.path(), "nameless", r#"{"version": "1.0.0"}"#);
        std::fs::create_dir_all(dir.path().join(".bin")).unwrap();
        std::fs::write(dir.path().join(".package-lock.json"), "{}").unwrap();

        let installed = scan_installed(dir.path()).await.unwrap();

        assert_eq!(installed.len(), 1);
        assert!(installed.contains_key("good"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn scan_follows_symlinked_packages() {
        let dir = TempDir::new().unwrap();
        let node_modules = dir.path().join("node_modules");
        install(dir.path(), "packages/linked", r#"{"name": "linked", "version": "0.2.0"}"#);
        std::fs::create_dir_all(&node_modules).unwrap();
        std::os::unix::fs::symlink(dir.path().join("packages/linked"), node_modules.join("linked"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("dangling"), node_modules.join("dangling"))
            .unwrap();

        let installed = scan_installed(&node_modules).await.unwrap();
        let single = read_installed(&node_modules, "linked").await.unwrap();

        assert_eq!(installed.len(), 1);
        assert_eq!(installed["linked"], "0.2.0");
        assert_eq!(single.version, installed["linked"]);
    }

    #[tokio::test]
    async fn scan_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let installed = scan_installed(&dir.path().join("node_modules")).await.unwrap();
        assert!(installed.is_empty());
    }

    #[tokio::test]
    async fn read_installed_package() {
        let dir = TempDir::new().unwrap();
        install(dir.path(), "chalk", r#"{"name": "chalk", "version": "5.3.0"}"#);

        let pkg = read_installed(dir.path(), "chalk").await.unwrap();

        assert_eq!(pkg.name, "chalk");
        assert_eq!(pkg.version, "5.3.0");
        assert_eq!(pkg.path, dir.path().join("chalk"));
    }

    #[tokio::test]
    async fn read_installed_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let err = read_installed(dir.path(), "ghost").await.unwrap_err();
        assert!(matches!(err, ModcacheError::PackageNotInstalled { ref name, .. } if name == "ghost"));
    }

    #[tokio::test]
    async fn read_installed_without_version_is_error() {
        let dir = TempDir::new().unwrap();
        install(dir.path(), "odd", r#"{"name": "odd"}"#);
        let err = read_installed(dir.path(), "odd").await.unwrap_err();
        assert!(matches!(err, ModcacheError::PackageNotInstalled { .. }));
    }
}

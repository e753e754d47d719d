//! Configuration management for modcache

pub mod schema;
pub mod settings;

pub use schema::Config;
pub use settings::Settings;

use crate::error::{ModcacheError, ModcacheResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Project-local config filename
pub const LOCAL_CONFIG_FILE: &str = ".modcache.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("modcache")
            .join("config.toml")
    }

    /// Find the project-local config in `project_dir`
    pub fn find_local_config(project_dir: &Path) -> Option<PathBuf> {
        let path = project_dir.join(LOCAL_CONFIG_FILE);
        path.is_file().then_some(path)
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> ModcacheResult<Config> {
        let value = self.load_value().await?;
        Self::from_value(&self.config_path, value)
    }

    /// Load the global configuration and overlay a project-local file on top
    pub async fn load_merged(&self, local: Option<&Path>) -> ModcacheResult<Config> {
        let mut merged = self.load_value().await?;

        if let Some(path) = local {
            debug!("Merging local config {}", path.display());
            let overlay = Self::read_value(path).await?;
            merge_tables(&mut merged, overlay);
        }

        Self::from_value(local.unwrap_or(&self.config_path), merged)
    }

    async fn load_value(&self) -> ModcacheResult<toml::Table> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(toml::Table::new());
        }
        Self::read_value(&self.config_path).await
    }

    async fn read_value(path: &Path) -> ModcacheResult<toml::Table> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ModcacheError::io(format!("reading config from {}", path.display()), e))?;

        content
            .parse::<toml::Table>()
            .map_err(|e| ModcacheError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn from_value(path: &Path, value: toml::Table) -> ModcacheResult<Config> {
        toml::Value::Table(value)
            .try_into()
            .map_err(|e: toml::de::Error| ModcacheError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively overlay `overlay` onto `base`; overlay keys win
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming)
                if matches!(base.get(&key), Some(toml::Value::Table(_))) =>
            {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, incoming);
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

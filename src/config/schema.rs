//! Configuration schema for modcache
//!
//! Global configuration lives at `~/.config/modcache/config.toml`; a project
//! may override any key in `.modcache.toml` next to its `package.json`.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project layout settings
    pub project: ProjectConfig,

    /// Cache settings
    pub cache: CacheConfig,
}

/// Project layout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Only process runtime dependencies
    pub production: bool,

    /// Manifest filename, relative to the project root
    pub manifest: String,

    /// Installed-modules directory, relative to the project root
    pub node_modules: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            production: false,
            manifest: "package.json".to_string(),
            node_modules: "node_modules".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root directory, relative to the project root
    pub dir: String,

    /// Gzip compression level (0-9)
    pub compression_level: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: ".modules".to_string(),
            compression_level: 6,
        }
    }
}

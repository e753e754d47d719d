//! Resolved runtime settings
//!
//! Combines the loaded configuration with command-line flags and the
//! environment into the values one invocation runs with.

use crate::config::Config;
use std::path::PathBuf;

/// Settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Project root
    pub cwd: PathBuf,
    /// Process only runtime dependencies
    pub production: bool,
    /// Manifest filename, relative to `cwd`
    pub manifest: String,
    /// Installed-modules directory, relative to `cwd`
    pub node_modules: String,
    /// Cache root, relative to `cwd`
    pub cache_dir: String,
    /// Gzip compression level
    pub compression_level: u32,
}

impl Settings {
    /// Defaults for a project root
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self::resolve(&Config::default(), cwd, false, None)
    }

    /// Resolve settings from config, the `--production` flag and `NODE_ENV`.
    ///
    /// Production mode is on if any of the three sources asks for it.
    pub fn resolve(
        config: &Config,
        cwd: impl Into<PathBuf>,
        production_flag: bool,
        node_env: Option<&str>,
    ) -> Self {
        let production =
            production_flag || config.project.production || node_env == Some("production");

        Self {
            cwd: cwd.into(),
            production,
            manifest: config.project.manifest.clone(),
            node_modules: config.project.node_modules.clone(),
            cache_dir: config.cache.dir.clone(),
            compression_level: config.cache.compression_level,
        }
    }

    /// Builder-style production toggle
    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }
}

//! Error types for modcache
//!
//! All modules use `ModcacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for modcache operations
pub type ModcacheResult<T> = Result<T, ModcacheError>;

/// All errors that can occur in modcache
#[derive(Error, Debug)]
pub enum ModcacheError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    // Cache errors
    #[error("Malformed archive name {filename}: {reason}")]
    MalformedArchiveName { filename: String, reason: String },

    #[error("{0} is not declared in dependencies or devDependencies")]
    UnknownModule(String),

    #[error("Package {name} is not installed: {reason}")]
    PackageNotInstalled { name: String, reason: String },

    #[error("Failed to {operation} {path}: {reason}")]
    ArchiveIo {
        operation: &'static str,
        path: PathBuf,
        reason: String,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ModcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an archive operation error
    pub fn archive(
        operation: &'static str,
        path: impl Into<PathBuf>,
        reason: impl ToString,
    ) -> Self {
        Self::ArchiveIo {
            operation,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a malformed archive name error
    pub fn malformed(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedArchiveName {
            filename: filename.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownModule(_) => {
                Some("Add it to dependencies or devDependencies in package.json first")
            }
            Self::PackageNotInstalled { .. } => Some("Run: npm install"),
            Self::ConfigNotFound(_) => Some("Run modcache from the project root or pass --cwd"),
            _ => None,
        }
    }
}

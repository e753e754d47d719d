//! Archive naming codec
//!
//! Archives are named `<name>-v<version>.tgz`. Decoding splits on the last
//! `-v`, so package names may contain hyphens (and even `-v`) while versions
//! may not contain the separator. The extension is matched exactly.

use crate::error::{ModcacheError, ModcacheResult};
use serde::Serialize;
use std::fmt;

/// Separator between package name and version
pub const SEPARATOR: &str = "-v";

/// Archive file extension (without the dot)
pub const EXTENSION: &str = "tgz";

/// A `(name, version)` pair identifying one cached archive
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ArchiveName {
    pub name: String,
    pub version: String,
}

impl ArchiveName {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Filename for this archive inside a bucket directory.
    ///
    /// Fails for pairs whose filename would not decode back to the same pair
    /// or would not be picked up by a bucket scan.
    pub fn encode(&self) -> ModcacheResult<String> {
        let filename = format!("{}{}{}.{}", self.name, SEPARATOR, self.version, EXTENSION);

        let reason = if self.name.is_empty() {
            "empty package name"
        } else if self.version.is_empty() {
            "empty version"
        } else if self.version.contains(SEPARATOR) {
            "version contains the -v separator"
        } else if self.name.starts_with('.') {
            "package name starts with a dot"
        } else if filename.contains(['/', '\\']) {
            "path separator in name or version"
        } else {
            return Ok(filename);
        };

        Err(ModcacheError::malformed(filename, reason))
    }

    /// Parse an archive filename back into its name and version
    pub fn decode(filename: &str) -> ModcacheResult<Self> {
        let stem = strip_extension(filename)
            .ok_or_else(|| ModcacheError::malformed(filename, "missing .tgz extension"))?;

        let pos = stem
            .rfind(SEPARATOR)
            .ok_or_else(|| ModcacheError::malformed(filename, "no -v separator"))?;

        let name = &stem[..pos];
        let version = &stem[pos + SEPARATOR.len()..];

        if name.is_empty() {
            return Err(ModcacheError::malformed(filename, "empty package name"));
        }
        if version.is_empty() {
            return Err(ModcacheError::malformed(filename, "empty version"));
        }

        Ok(Self::new(name, version))
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Whether a filename carries the archive extension
pub fn is_archive(filename: &str) -> bool {
    strip_extension(filename).is_some()
}

fn strip_extension(filename: &str) -> Option<&str> {
    let (stem, ext) = filename.rsplit_once('.')?;
    (ext == EXTENSION).then_some(stem)
}

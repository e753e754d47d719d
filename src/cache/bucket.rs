//! Dependency buckets
//!
//! A bucket ties one manifest section to one cache subdirectory.

use serde::Serialize;
use std::fmt;

/// One of the two dependency classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Bucket {
    /// `dependencies` in package.json
    #[serde(rename = "dependencies")]
    Dependencies,
    /// `devDependencies` in package.json
    #[serde(rename = "devDependencies")]
    DevDependencies,
}

impl Bucket {
    /// Cache subdirectory name (also the manifest key)
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Dependencies => "dependencies",
            Self::DevDependencies => "devDependencies",
        }
    }

    /// Buckets processed in the given mode, in processing order
    pub fn active(production: bool) -> &'static [Self] {
        if production {
            &[Self::Dependencies]
        } else {
            &[Self::Dependencies, Self::DevDependencies]
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

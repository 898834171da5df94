//! Catalog configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where catalog rows live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    /// redb database file.
    #[default]
    Redb,
    /// Binary snapshot file, loaded into memory.
    File,
}

impl fmt::Display for CatalogBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redb => write!(f, "redb"),
            Self::File => write!(f, "file"),
        }
    }
}

/// Which catalog to open. Built once and passed to [`crate::CatalogStore::open`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub backend: CatalogBackend,
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: CatalogBackend::Redb,
            path: PathBuf::from("machinist.db"),
        }
    }
}

impl CatalogConfig {
    #[must_use]
    pub fn new(backend: CatalogBackend, path: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            path: path.into(),
        }
    }
}

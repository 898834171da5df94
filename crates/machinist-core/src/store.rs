//! # Catalog Store
//!
//! The catalog behind a configured backend.
//!
//! ## Backends
//!
//! - `Persistent`: a [`RedbCatalog`] (ACID, queried in place)
//! - `File`: a binary snapshot loaded into a [`MemoryCatalog`]; imports
//!   rewrite the file
//!
//! Selectors only see `&dyn Catalog`. The store adds the write side used by
//! catalog management (init, import).

use crate::catalog::{
    Catalog, CatalogCounts, CatalogSnapshot, MachineQuery, MaterialQuery, MemoryCatalog,
};
use crate::config::{CatalogBackend, CatalogConfig};
use crate::formats::{snapshot_from_bytes, snapshot_to_bytes};
use crate::storage::RedbCatalog;
use crate::types::{MachineRecord, MaterialRecord, MachinistError};
use std::path::{Path, PathBuf};

/// An opened catalog.
#[derive(Debug)]
pub enum CatalogStore {
    Persistent(RedbCatalog),
    File {
        catalog: MemoryCatalog,
        path: PathBuf,
    },
}

impl CatalogStore {
    /// Open an existing catalog.
    ///
    /// A missing or unreadable catalog is a retrieval failure.
    pub fn open(config: &CatalogConfig) -> Result<Self, MachinistError> {
        match config.backend {
            CatalogBackend::Redb => Ok(Self::Persistent(RedbCatalog::open(&config.path)?)),
            CatalogBackend::File => {
                let bytes = std::fs::read(&config.path).map_err(|e| {
                    MachinistError::RetrievalFailed(format!(
                        "cannot read catalog '{}': {}",
                        config.path.display(),
                        e
                    ))
                })?;
                let snapshot = snapshot_from_bytes(&bytes)
                    .map_err(|e| MachinistError::RetrievalFailed(e.to_string()))?;
                Ok(Self::File {
                    catalog: MemoryCatalog::from_snapshot(snapshot),
                    path: config.path.clone(),
                })
            }
        }
    }

    /// Create a catalog.
    ///
    /// An existing redb database keeps its rows. The file backend always
    /// writes an empty snapshot, so callers must check for an existing file.
    pub fn create(config: &CatalogConfig) -> Result<Self, MachinistError> {
        match config.backend {
            CatalogBackend::Redb => Ok(Self::Persistent(RedbCatalog::create(&config.path)?)),
            CatalogBackend::File => {
                let catalog = MemoryCatalog::new();
                write_snapshot(&config.path, &CatalogSnapshot::default())?;
                Ok(Self::File {
                    catalog,
                    path: config.path.clone(),
                })
            }
        }
    }

    /// Insert or replace rows by key and persist them.
    pub fn import(&mut self, snapshot: CatalogSnapshot) -> Result<CatalogCounts, MachinistError> {
        match self {
            Self::Persistent(redb) => redb.upsert(&snapshot),
            Self::File { catalog, path } => {
                catalog.upsert(snapshot);
                write_snapshot(path, &catalog.snapshot()?)?;
                catalog.counts()
            }
        }
    }

    #[must_use]
    pub fn backend(&self) -> CatalogBackend {
        match self {
            Self::Persistent(_) => CatalogBackend::Redb,
            Self::File { .. } => CatalogBackend::File,
        }
    }

    fn inner(&self) -> &dyn Catalog {
        match self {
            Self::Persistent(redb) => redb,
            Self::File { catalog, .. } => catalog,
        }
    }
}

fn write_snapshot(path: &Path, snapshot: &CatalogSnapshot) -> Result<(), MachinistError> {
    let bytes = snapshot_to_bytes(snapshot)?;
    std::fs::write(path, bytes).map_err(|e| {
        MachinistError::IoError(format!("cannot write '{}': {}", path.display(), e))
    })
}

impl Catalog for CatalogStore {
    fn query_materials(
        &self,
        query: &MaterialQuery,
    ) -> Result<Vec<MaterialRecord>, MachinistError> {
        self.inner().query_materials(query)
    }

    fn query_machines(&self, query: &MachineQuery) -> Result<Vec<MachineRecord>, MachinistError> {
        self.inner().query_machines(query)
    }

    fn counts(&self) -> Result<CatalogCounts, MachinistError> {
        self.inner().counts()
    }

    fn snapshot(&self) -> Result<CatalogSnapshot, MachinistError> {
        self.inner().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Decimal;
    use crate::types::MachineRow;
    use tempfile::tempdir;

    fn seed() -> CatalogSnapshot {
        CatalogSnapshot {
            materials: vec![],
            machines: vec![MachineRow {
                id: "VF-2".to_string(),
                supported_material_categories: "Aluminum".to_string(),
                max_tolerance_mm: Decimal::parse("0.05").expect("dec"),
                geometry_capability: vec!["prismatic".to_string()],
                surface_finish_capability: Some("standard".to_string()),
                special_features: vec![],
                status: "available".to_string(),
            }],
        }
    }

    #[test]
    fn file_backend_persists_imports() {
        let temp = tempdir().expect("temp dir");
        let config = CatalogConfig::new(CatalogBackend::File, temp.path().join("catalog.mcat"));

        let mut store = CatalogStore::create(&config).expect("create");
        let counts = store.import(seed()).expect("import");
        assert_eq!(counts.machines, 1);

        let reopened = CatalogStore::open(&config).expect("open");
        assert_eq!(reopened.backend(), CatalogBackend::File);
        assert_eq!(reopened.snapshot().expect("snapshot"), seed());
    }

    #[test]
    fn redb_backend_persists_imports() {
        let temp = tempdir().expect("temp dir");
        let config = CatalogConfig::new(CatalogBackend::Redb, temp.path().join("catalog.db"));

        {
            let mut store = CatalogStore::create(&config).expect("create");
            store.import(seed()).expect("import");
        }

        let reopened = CatalogStore::open(&config).expect("open");
        assert_eq!(reopened.counts().expect("counts").machines, 1);
    }

    #[test]
    fn missing_file_is_retrieval_failure() {
        let temp = tempdir().expect("temp dir");
        let config = CatalogConfig::new(CatalogBackend::File, temp.path().join("nope.mcat"));
        assert!(matches!(
            CatalogStore::open(&config),
            Err(MachinistError::RetrievalFailed(_))
        ));
    }
}

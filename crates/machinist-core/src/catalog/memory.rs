//! In-memory catalog.

use super::{Catalog, CatalogCounts, CatalogSnapshot, MachineQuery, MaterialQuery};
use crate::types::{MachineRecord, MaterialRecord, MachinistError};

/// A catalog whose rows live in memory.
///
/// Backs the `file` storage backend (a snapshot file loaded at startup) and
/// the test suites. Rows are canonicalized on construction.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    snapshot: CatalogSnapshot,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            snapshot: snapshot.canonical(),
        }
    }

    /// Insert or replace rows by key.
    pub fn upsert(&mut self, incoming: CatalogSnapshot) {
        let mut merged = std::mem::take(&mut self.snapshot);
        merged.materials.extend(incoming.materials);
        merged.machines.extend(incoming.machines);
        self.snapshot = merged.canonical();
    }
}

impl Catalog for MemoryCatalog {
    fn query_materials(
        &self,
        query: &MaterialQuery,
    ) -> Result<Vec<MaterialRecord>, MachinistError> {
        Ok(self
            .snapshot
            .materials
            .iter()
            .filter(|m| query.matches(m))
            .cloned()
            .collect())
    }

    fn query_machines(&self, query: &MachineQuery) -> Result<Vec<MachineRecord>, MachinistError> {
        Ok(self
            .snapshot
            .machines
            .iter()
            .map(MachineRecord::from)
            .filter(|m| query.matches(m))
            .collect())
    }

    fn counts(&self) -> Result<CatalogCounts, MachinistError> {
        Ok(self.snapshot.counts())
    }

    fn snapshot(&self) -> Result<CatalogSnapshot, MachinistError> {
        Ok(self.snapshot.clone())
    }
}

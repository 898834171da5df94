//! # redb-backed Catalog
//!
//! A disk-backed catalog using the redb embedded database.
//!
//! Rows are postcard-encoded and keyed by their natural key:
//! - `materials`: material name → `MaterialRecord`
//! - `machines`: machine id → `MachineRow`
//!
//! ## Read Scope
//!
//! Every query opens one read transaction and drops it before returning,
//! on success and on every error path. redb's MVCC lets concurrent queries
//! read while an import is being written; each query sees one consistent
//! snapshot.

use crate::catalog::{Catalog, CatalogCounts, CatalogSnapshot, MachineQuery, MaterialQuery};
use crate::types::{MachineRecord, MachineRow, MaterialRecord, MachinistError};
use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    TableDefinition,
};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Table for materials: name -> serialized MaterialRecord bytes
const MATERIALS: TableDefinition<&str, &[u8]> = TableDefinition::new("materials");

/// Table for machines: id -> serialized MachineRow bytes
const MACHINES: TableDefinition<&str, &[u8]> = TableDefinition::new("machines");

fn retrieval(e: impl std::fmt::Display) -> MachinistError {
    MachinistError::RetrievalFailed(e.to_string())
}

fn write_failed(e: impl std::fmt::Display) -> MachinistError {
    MachinistError::IoError(e.to_string())
}

/// A disk-backed catalog.
pub struct RedbCatalog {
    db: Database,
}

impl std::fmt::Debug for RedbCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbCatalog").finish_non_exhaustive()
    }
}

impl RedbCatalog {
    /// Open an existing catalog database.
    ///
    /// A missing file is a retrieval failure; use [`RedbCatalog::create`] to
    /// initialize one.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MachinistError> {
        let db = Database::open(path.as_ref()).map_err(retrieval)?;
        Ok(Self { db })
    }

    /// Open or create a catalog database and make sure both tables exist.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, MachinistError> {
        let db = Database::create(path.as_ref()).map_err(write_failed)?;
        {
            let write_txn = db.begin_write().map_err(write_failed)?;
            let _ = write_txn.open_table(MATERIALS).map_err(write_failed)?;
            let _ = write_txn.open_table(MACHINES).map_err(write_failed)?;
            write_txn.commit().map_err(write_failed)?;
        }
        Ok(Self { db })
    }

    /// Insert or replace rows by key in a single ACID transaction.
    ///
    /// Returns the row counts after the write.
    pub fn upsert(&self, snapshot: &CatalogSnapshot) -> Result<CatalogCounts, MachinistError> {
        let write_txn = self.db.begin_write().map_err(write_failed)?;
        {
            let mut materials = write_txn.open_table(MATERIALS).map_err(write_failed)?;
            for material in &snapshot.materials {
                let bytes = postcard::to_stdvec(material)
                    .map_err(|e| MachinistError::SerializationError(e.to_string()))?;
                materials
                    .insert(material.name.as_str(), bytes.as_slice())
                    .map_err(write_failed)?;
            }

            let mut machines = write_txn.open_table(MACHINES).map_err(write_failed)?;
            for machine in &snapshot.machines {
                let bytes = postcard::to_stdvec(machine)
                    .map_err(|e| MachinistError::SerializationError(e.to_string()))?;
                machines
                    .insert(machine.id.as_str(), bytes.as_slice())
                    .map_err(write_failed)?;
            }
        }
        write_txn.commit().map_err(write_failed)?;
        self.counts()
    }

    fn read(&self) -> Result<ReadTransaction, MachinistError> {
        self.db.begin_read().map_err(retrieval)
    }

    /// Decode every row of a table.
    fn scan<T: DeserializeOwned>(
        txn: &ReadTransaction,
        definition: TableDefinition<'static, &'static str, &'static [u8]>,
    ) -> Result<Vec<T>, MachinistError> {
        let table = txn.open_table(definition).map_err(retrieval)?;
        let mut rows = Vec::new();
        for entry in table.iter().map_err(retrieval)? {
            let (key, value) = entry.map_err(retrieval)?;
            let row = postcard::from_bytes(value.value()).map_err(|e| {
                MachinistError::RetrievalFailed(format!("corrupt row '{}': {}", key.value(), e))
            })?;
            rows.push(row);
        }
        Ok(rows)
    }
}

impl Catalog for RedbCatalog {
    fn query_materials(
        &self,
        query: &MaterialQuery,
    ) -> Result<Vec<MaterialRecord>, MachinistError> {
        let txn = self.read()?;
        let rows: Vec<MaterialRecord> = Self::scan(&txn, MATERIALS)?;
        Ok(rows.into_iter().filter(|m| query.matches(m)).collect())
    }

    fn query_machines(&self, query: &MachineQuery) -> Result<Vec<MachineRecord>, MachinistError> {
        let txn = self.read()?;
        let rows: Vec<MachineRow> = Self::scan(&txn, MACHINES)?;
        Ok(rows
            .iter()
            .map(MachineRecord::from)
            .filter(|m| query.matches(m))
            .collect())
    }

    fn counts(&self) -> Result<CatalogCounts, MachinistError> {
        let txn = self.read()?;
        let materials = txn.open_table(MATERIALS).map_err(retrieval)?;
        let machines = txn.open_table(MACHINES).map_err(retrieval)?;
        Ok(CatalogCounts {
            materials: materials.len().map_err(retrieval)? as usize,
            machines: machines.len().map_err(retrieval)? as usize,
        })
    }

    fn snapshot(&self) -> Result<CatalogSnapshot, MachinistError> {
        let txn = self.read()?;
        let snapshot = CatalogSnapshot {
            materials: Self::scan(&txn, MATERIALS)?,
            machines: Self::scan(&txn, MACHINES)?,
        };
        Ok(snapshot.canonical())
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! # Catalog Module
//!
//! The narrow request/response contract between the selectors and whatever
//! holds the catalog rows.
//!
//! A catalog executes the HARD filter of a query (the part a SQL backend
//! would put in its `WHERE` clause) and returns matching rows. Ranking,
//! limits and soft filters are the selectors' job.
//!
//! ## Backends
//!
//! - [`MemoryCatalog`]: rows held in memory (snapshot files, tests)
//! - [`crate::storage::RedbCatalog`]: rows in a redb database
//!
//! Each `query_*` call is one read-only query. Implementations acquire their
//! read handle inside the call and release it before returning.

mod memory;

pub use memory::MemoryCatalog;

use crate::decimal::Decimal;
use crate::types::{MachineRecord, MachineRow, MaterialRecord, MachinistError};
use serde::{Deserialize, Serialize};

// =============================================================================
// QUERIES
// =============================================================================

/// Hard filter for the material table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialQuery {
    pub min_temperature: Decimal,
    pub aerospace_grade: bool,
}

impl MaterialQuery {
    /// `max_operating_temp_c >= min_temperature AND aerospace_grade == flag`.
    #[must_use]
    pub fn matches(&self, record: &MaterialRecord) -> bool {
        record.max_operating_temp_c >= self.min_temperature
            && record.aerospace_grade == self.aerospace_grade
    }
}

/// Hard filter for the machine table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineQuery {
    pub material_category: String,
    pub max_tolerance: Decimal,
}

impl MachineQuery {
    /// Category membership, tolerance bound and availability.
    #[must_use]
    pub fn matches(&self, record: &MachineRecord) -> bool {
        record.supports_category(&self.material_category)
            && record.max_tolerance_mm <= self.max_tolerance
            && record.is_available()
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Every row of a catalog, as stored.
///
/// This is also the shape of seed files: `{ "materials": [...], "machines": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub materials: Vec<MaterialRecord>,
    #[serde(default)]
    pub machines: Vec<MachineRow>,
}

impl CatalogSnapshot {
    /// Sort rows by key (material name, machine id) and drop duplicate keys,
    /// keeping the last occurrence.
    ///
    /// Two snapshots with the same rows canonicalize to identical values
    /// regardless of insertion order.
    #[must_use]
    pub fn canonical(mut self) -> Self {
        self.materials.reverse();
        self.materials.sort_by(|a, b| a.name.cmp(&b.name));
        self.materials.dedup_by(|a, b| a.name == b.name);

        self.machines.reverse();
        self.machines.sort_by(|a, b| a.id.cmp(&b.id));
        self.machines.dedup_by(|a, b| a.id == b.id);
        self
    }

    #[must_use]
    pub fn counts(&self) -> CatalogCounts {
        CatalogCounts {
            materials: self.materials.len(),
            machines: self.machines.len(),
        }
    }
}

/// Row counts of a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCounts {
    pub materials: usize,
    pub machines: usize,
}

// =============================================================================
// CATALOG TRAIT
// =============================================================================

/// Read access to a material/machine catalog.
///
/// Implementations must return only rows for which the query's `matches`
/// holds. Order of returned rows is unspecified.
///
/// `Send + Sync` so a single catalog can serve concurrent requests; every
/// method takes `&self` and keeps no per-request state.
pub trait Catalog: Send + Sync {
    /// Materials passing the hard filter.
    fn query_materials(&self, query: &MaterialQuery)
    -> Result<Vec<MaterialRecord>, MachinistError>;

    /// Machines passing the hard filter, parsed into records.
    fn query_machines(&self, query: &MachineQuery) -> Result<Vec<MachineRecord>, MachinistError>;

    /// Number of rows in each table.
    fn counts(&self) -> Result<CatalogCounts, MachinistError>;

    /// Every stored row, canonicalized.
    fn snapshot(&self) -> Result<CatalogSnapshot, MachinistError>;
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn material(name: &str) -> MaterialRecord {
        MaterialRecord {
            name: name.to_string(),
            category: "Steel".to_string(),
            grade: String::new(),
            machinability_rating: Decimal::ZERO,
            tensile_strength_mpa: Decimal::ZERO,
            yield_strength_mpa: Decimal::ZERO,
            max_operating_temp_c: Decimal::from_int(400),
            aerospace_grade: false,
            cost_per_kg: Decimal::from_int(3),
        }
    }

    #[test]
    fn canonical_sorts_and_keeps_last_duplicate() {
        let mut replaced = material("A");
        replaced.grade = "new".to_string();
        let snapshot = CatalogSnapshot {
            materials: vec![material("B"), material("A"), replaced.clone()],
            machines: vec![],
        }
        .canonical();

        assert_eq!(snapshot.materials.len(), 2);
        assert_eq!(snapshot.materials[0], replaced);
        assert_eq!(snapshot.materials[1].name, "B");
    }

    #[test]
    fn material_query_boundary_is_inclusive() {
        let query = MaterialQuery {
            min_temperature: Decimal::from_int(400),
            aerospace_grade: false,
        };
        assert!(query.matches(&material("A")));

        let stricter = MaterialQuery {
            min_temperature: Decimal::parse("400.5").expect("dec"),
            ..query
        };
        assert!(!stricter.matches(&material("A")));
    }
}

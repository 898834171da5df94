//! # machinist-core
//!
//! The deterministic selection engine for Machinist - THE LOGIC.
//!
//! Given engineering constraints for a component, the engine shortlists
//! materials from a catalog and then finds machines able to cut the chosen
//! material category.
//!
//! ## Pipeline
//!
//! ```text
//! min_temperature, aerospace ──► MaterialSelector ──► ranked materials (≤ 5)
//!                                                        │ caller picks one
//!                                                        ▼ category
//! tolerance, geometry?, finish?, features? ──► MachineSelector ──► Found | NoMatch
//!                                                        │
//!                                                        ▼
//!                                                    sanitize() ──► plain f64 output
//! ```
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Exact decimal comparisons; floats only after sanitization
//! - One read-only catalog query per selection
//! - No shared mutable state: selectors borrow a `&dyn Catalog`

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod config;
pub mod decimal;
pub mod formats;
pub mod primitives;
pub mod sanitize;
pub mod selector;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use decimal::{Decimal, DecimalError};
pub use types::{MachineRecord, MachineRow, MachineStatus, MaterialRecord, MachinistError};

// =============================================================================
// RE-EXPORTS: Catalog
// =============================================================================

pub use catalog::{
    Catalog, CatalogCounts, CatalogSnapshot, MachineQuery, MaterialQuery, MemoryCatalog,
};
pub use config::{CatalogBackend, CatalogConfig};
pub use storage::RedbCatalog;
pub use store::CatalogStore;

// =============================================================================
// RE-EXPORTS: Selection
// =============================================================================

pub use sanitize::{
    PlainMachine, PlainMaterial, PlainNoMatch, PlainRequirements, PlainSelection, Sanitize,
    sanitize,
};
pub use selector::{
    FilterStage, MachineRequirements, MachineSelection, MachineSelector, MaterialSelector,
    NoMatch,
};

// =============================================================================
// RE-EXPORTS: Formats
// =============================================================================

#[cfg(feature = "crypto-hash")]
pub use formats::snapshot_fingerprint;
pub use formats::{SnapshotHeader, is_snapshot, snapshot_from_bytes, snapshot_to_bytes};

//! # Core Type Definitions
//!
//! This module contains the catalog projections and error types used by the
//! selection engine:
//! - Material rows (`MaterialRecord`)
//! - Machine rows as stored (`MachineRow`) and as parsed (`MachineRecord`)
//! - Machine availability (`MachineStatus`)
//! - Error types (`MachinistError`)
//!
//! ## Parsing Boundary
//!
//! Catalogs store some collections as delimited text. They are split into
//! `BTreeSet`s exactly once, when a `MachineRow` becomes a `MachineRecord`.
//! Selection logic never looks at the delimited form.

use crate::decimal::{Decimal, DecimalError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

// =============================================================================
// MATERIAL
// =============================================================================

/// A row of the `materials` table.
///
/// `category` is the coarse class shared with the machine catalog
/// (e.g. "Superalloy"); `name` is the specific alloy (e.g. "Inconel 718").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRecord {
    #[serde(alias = "material_name")]
    pub name: String,
    #[serde(alias = "material_type")]
    pub category: String,
    #[serde(default)]
    pub grade: String,
    pub machinability_rating: Decimal,
    pub tensile_strength_mpa: Decimal,
    pub yield_strength_mpa: Decimal,
    pub max_operating_temp_c: Decimal,
    pub aerospace_grade: bool,
    pub cost_per_kg: Decimal,
}

// =============================================================================
// MACHINE
// =============================================================================

/// Availability of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    Available,
    Unavailable,
}

impl MachineStatus {
    /// Parse a catalog status string.
    ///
    /// Only `available` (any case, surrounding whitespace ignored) is
    /// available; every other status ("maintenance", "", ...) is not.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("available") {
            Self::Available
        } else {
            Self::Unavailable
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        }
    }
}

/// A row of the `machines` table, in its stored shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineRow {
    #[serde(alias = "machine_id")]
    pub id: String,
    /// Comma-delimited, e.g. `"Superalloy, Titanium, Steel"`.
    #[serde(alias = "supported_material_type")]
    pub supported_material_categories: String,
    pub max_tolerance_mm: Decimal,
    #[serde(default)]
    pub geometry_capability: Vec<String>,
    #[serde(default)]
    pub surface_finish_capability: Option<String>,
    #[serde(default)]
    pub special_features: Vec<String>,
    pub status: String,
}

/// A machine as seen by the selector: delimited and list columns parsed into
/// sets, status parsed into an enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineRecord {
    pub id: String,
    pub supported_material_categories: BTreeSet<String>,
    pub max_tolerance_mm: Decimal,
    pub geometry_capability: BTreeSet<String>,
    /// Raw label; ranked by [`crate::primitives::surface_finish_rank`].
    pub surface_finish_capability: String,
    pub special_features: BTreeSet<String>,
    pub status: MachineStatus,
}

impl MachineRecord {
    #[must_use]
    pub fn supports_category(&self, category: &str) -> bool {
        self.supported_material_categories.contains(category)
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == MachineStatus::Available
    }
}

impl From<&MachineRow> for MachineRecord {
    fn from(row: &MachineRow) -> Self {
        Self {
            id: row.id.clone(),
            supported_material_categories: split_delimited(&row.supported_material_categories),
            max_tolerance_mm: row.max_tolerance_mm,
            geometry_capability: token_set(&row.geometry_capability),
            surface_finish_capability: row.surface_finish_capability.clone().unwrap_or_default(),
            special_features: token_set(&row.special_features),
            status: MachineStatus::parse(&row.status),
        }
    }
}

/// Split a comma-delimited column into trimmed, non-empty tokens.
#[must_use]
pub fn split_delimited(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalize a list column. Entries that themselves contain commas are split,
/// since some catalog exports flatten arrays into delimited text.
fn token_set(values: &[String]) -> BTreeSet<String> {
    values.iter().flat_map(|v| split_delimited(v)).collect()
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in Machinist.
///
/// - Retrieval and validation failures terminate the current selection call
/// - An empty selection is NOT an error (see `MachineSelection::NoMatch`)
#[derive(Debug, Error)]
pub enum MachinistError {
    /// The catalog could not be read (unreachable, corrupt, wrong schema).
    #[error("Catalog retrieval failed: {0}")]
    RetrievalFailed(String),

    /// A request parameter could not be turned into a usable value.
    #[error("Invalid {parameter}: {reason}")]
    ValidationFailed {
        parameter: String,
        reason: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl MachinistError {
    /// Build a validation failure for a named parameter.
    pub fn invalid(parameter: impl Into<String>, reason: impl ToString) -> Self {
        Self::ValidationFailed {
            parameter: parameter.into(),
            reason: reason.to_string(),
        }
    }

    /// Attach a parameter name to a decimal parse failure.
    pub fn from_decimal(parameter: impl Into<String>, error: DecimalError) -> Self {
        Self::invalid(parameter, error)
    }
}

// =============================================================================
// TESTS
// =============================================================================

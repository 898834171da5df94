//! # Innate Primitives
//!
//! Hardcoded lookup tables and limits for the selection engine.
//! They are compiled into the binary and are immutable at runtime.
//!
//! ## Tables
//!
//! 1. **Geometry complexity map**: user-facing difficulty level → machine
//!    capability tokens. A machine qualifies if it has ANY mapped token.
//! 2. **Surface finish ranks**: ordinal hierarchy where a higher-rated machine
//!    satisfies every lower requirement.

/// Maximum number of materials returned by one material selection.
pub const MATERIAL_SHORTLIST_LIMIT: usize = 5;

/// Geometry complexity levels and the capability tokens that satisfy them.
///
/// "complex" is a complexity LEVEL, not a catalog token, although a catalog
/// may also carry a literal `complex` capability.
pub const GEOMETRY_COMPLEXITY_MAP: &[(&str, &[&str])] = &[
    ("simple", &["prismatic"]),
    ("moderate", &["prismatic", "freeform"]),
    ("complex", &["freeform", "deep_bore", "complex"]),
];

/// Surface finish labels in ascending order of quality, with their ranks.
pub const SURFACE_FINISH_RANKS: &[(&str, u8)] =
    &[("standard", 1), ("high", 2), ("very high", 3), ("mirror", 4)];

/// Rank given to a machine whose finish label is not in the table.
pub const UNRANKED_FINISH: u8 = 0;

/// Rank assumed for a requested finish label that is not in the table.
///
/// An unrecognized requirement is treated as the lowest level rather than
/// rejecting the request.
pub const DEFAULT_REQUIRED_FINISH: u8 = 1;

/// Capability tokens for a geometry complexity level.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
/// Returns `None` for levels outside the map.
#[must_use]
pub fn geometry_capabilities(level: &str) -> Option<&'static [&'static str]> {
    let key = level.trim();
    GEOMETRY_COMPLEXITY_MAP
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, caps)| *caps)
}

/// Ordinal rank of a surface finish label, if it is a known label.
#[must_use]
pub fn surface_finish_rank(label: &str) -> Option<u8> {
    let key = label.trim();
    SURFACE_FINISH_RANKS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, rank)| *rank)
}

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for string request parameters (category, geometry, ...).
pub const MAX_PARAMETER_LENGTH: usize = 256;

/// Maximum number of required features in a single machine request.
pub const MAX_REQUIRED_FEATURES: usize = 64;

/// Magic bytes for the catalog snapshot header.
pub const MAGIC_BYTES: &[u8; 4] = b"MCAT";

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the snapshot format.
pub const FORMAT_VERSION: u8 = 1;

//! # Formats Module
//!
//! Serialization formats for catalog data.

mod snapshot;

pub use snapshot::*;

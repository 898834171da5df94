//! # Selector Module
//!
//! The two selection stages.
//!
//! - [`MaterialSelector`]: temperature/aerospace filter, ranked shortlist
//! - [`MachineSelector`]: category/tolerance/availability filter, then the
//!   geometry, surface finish and feature filters
//!
//! The stages share nothing but the catalog. A caller picks one material
//! from stage one and feeds its `category` into stage two.

mod machine;
mod material;

pub use machine::{
    FilterStage, MachineRequirements, MachineSelection, MachineSelector, NoMatch,
    features_qualify, finish_qualifies, geometry_qualifies,
};
pub use material::{MaterialSelector, rank_order};

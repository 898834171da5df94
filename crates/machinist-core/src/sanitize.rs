//! # Value Sanitizer
//!
//! Converts catalog-native decimals into plain `f64` at the output boundary.
//!
//! Every type that can carry a [`Decimal`] implements [`Sanitize`], whose
//! `Output` is the same shape with each decimal replaced by an `f64`.
//! Containers recurse; other scalars pass through unchanged.
//!
//! Conversion goes through the decimal's canonical text, so `0.1` becomes
//! the `f64` nearest to one tenth, never an accumulated approximation.

use crate::decimal::Decimal;
use crate::selector::{FilterStage, MachineRequirements, MachineSelection, NoMatch};
use crate::types::{MachineRecord, MachineStatus, MaterialRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A value that can be rendered without fixed-precision decimals.
pub trait Sanitize {
    type Output;

    fn sanitize(&self) -> Self::Output;
}

/// Sanitize any value.
pub fn sanitize<T: Sanitize + ?Sized>(value: &T) -> T::Output {
    value.sanitize()
}

impl Sanitize for Decimal {
    type Output = f64;

    fn sanitize(&self) -> f64 {
        self.to_f64()
    }
}

macro_rules! pass_through {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sanitize for $ty {
                type Output = $ty;

                fn sanitize(&self) -> $ty {
                    self.clone()
                }
            }
        )*
    };
}

pass_through!(String, bool, u8, u32, u64, usize, i32, i64, f64, MachineStatus, FilterStage);

impl<T: Sanitize> Sanitize for [T] {
    type Output = Vec<T::Output>;

    fn sanitize(&self) -> Self::Output {
        self.iter().map(Sanitize::sanitize).collect()
    }
}

impl<T: Sanitize> Sanitize for Vec<T> {
    type Output = Vec<T::Output>;

    fn sanitize(&self) -> Self::Output {
        self.as_slice().sanitize()
    }
}

impl<T: Sanitize> Sanitize for Option<T> {
    type Output = Option<T::Output>;

    fn sanitize(&self) -> Self::Output {
        self.as_ref().map(Sanitize::sanitize)
    }
}

impl<K: Ord + Clone, V: Sanitize> Sanitize for BTreeMap<K, V> {
    type Output = BTreeMap<K, V::Output>;

    fn sanitize(&self) -> Self::Output {
        self.iter().map(|(k, v)| (k.clone(), v.sanitize())).collect()
    }
}

// =============================================================================
// PLAIN RECORDS
// =============================================================================

/// [`MaterialRecord`] with plain floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainMaterial {
    pub name: String,
    pub category: String,
    pub grade: String,
    pub machinability_rating: f64,
    pub tensile_strength_mpa: f64,
    pub yield_strength_mpa: f64,
    pub max_operating_temp_c: f64,
    pub aerospace_grade: bool,
    pub cost_per_kg: f64,
}

impl Sanitize for MaterialRecord {
    type Output = PlainMaterial;

    fn sanitize(&self) -> PlainMaterial {
        PlainMaterial {
            name: self.name.clone(),
            category: self.category.clone(),
            grade: self.grade.clone(),
            machinability_rating: self.machinability_rating.sanitize(),
            tensile_strength_mpa: self.tensile_strength_mpa.sanitize(),
            yield_strength_mpa: self.yield_strength_mpa.sanitize(),
            max_operating_temp_c: self.max_operating_temp_c.sanitize(),
            aerospace_grade: self.aerospace_grade,
            cost_per_kg: self.cost_per_kg.sanitize(),
        }
    }
}

/// [`MachineRecord`] with plain floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainMachine {
    pub id: String,
    pub supported_material_categories: BTreeSet<String>,
    pub max_tolerance_mm: f64,
    pub geometry_capability: BTreeSet<String>,
    pub surface_finish_capability: String,
    pub special_features: BTreeSet<String>,
    pub status: MachineStatus,
}

impl Sanitize for MachineRecord {
    type Output = PlainMachine;

    fn sanitize(&self) -> PlainMachine {
        PlainMachine {
            id: self.id.clone(),
            supported_material_categories: self.supported_material_categories.clone(),
            max_tolerance_mm: self.max_tolerance_mm.sanitize(),
            geometry_capability: self.geometry_capability.clone(),
            surface_finish_capability: self.surface_finish_capability.clone(),
            special_features: self.special_features.clone(),
            status: self.status,
        }
    }
}

/// [`MachineRequirements`] with a plain float tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainRequirements {
    pub material_category: String,
    pub required_tolerance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_finish: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_features: Option<BTreeSet<String>>,
}

impl Sanitize for MachineRequirements {
    type Output = PlainRequirements;

    fn sanitize(&self) -> PlainRequirements {
        PlainRequirements {
            material_category: self.material_category.clone(),
            required_tolerance: self.required_tolerance.sanitize(),
            geometry_complexity: self.geometry_complexity.clone(),
            surface_finish: self.surface_finish.clone(),
            required_features: self.required_features.clone(),
        }
    }
}

/// [`NoMatch`] with plain floats and its narration rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainNoMatch {
    pub requirements: PlainRequirements,
    pub eliminated_by: FilterStage,
    pub catalog_candidates: usize,
    pub message: String,
}

impl Sanitize for NoMatch {
    type Output = PlainNoMatch;

    fn sanitize(&self) -> PlainNoMatch {
        PlainNoMatch {
            requirements: self.requirements.sanitize(),
            eliminated_by: self.eliminated_by,
            catalog_candidates: self.catalog_candidates,
            message: self.to_string(),
        }
    }
}

/// [`MachineSelection`] with plain floats, tagged by `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlainSelection {
    Found { machines: Vec<PlainMachine> },
    NoMatch(PlainNoMatch),
}

impl Sanitize for MachineSelection {
    type Output = PlainSelection;

    fn sanitize(&self) -> PlainSelection {
        match self {
            Self::Found(machines) => PlainSelection::Found {
                machines: machines.sanitize(),
            },
            Self::NoMatch(no_match) => PlainSelection::NoMatch(no_match.sanitize()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(text: &str) -> Decimal {
        Decimal::parse(text).expect("dec")
    }

    #[test]
    fn decimal_becomes_nearest_float() {
        assert_eq!(sanitize(&dec("0.1")), 0.1);
        assert_eq!(sanitize(&dec("42.50")), 42.5);
        assert_eq!(sanitize(&dec("-3")), -3.0);
    }

    #[test]
    fn containers_recurse() {
        let values = vec![Some(dec("1.5")), None];
        assert_eq!(sanitize(&values), vec![Some(1.5), None]);

        let map = BTreeMap::from([("a".to_string(), dec("2"))]);
        assert_eq!(sanitize(&map)["a"], 2.0);

        assert_eq!(sanitize(&"Titanium".to_string()), "Titanium");
    }

    #[test]
    fn no_match_keeps_requirements_and_narration() {
        let requirements = MachineRequirements::new("Superalloy", dec("0.01"))
            .with_geometry("complex")
            .with_features(["5-axis"]);
        let selection = MachineSelection::NoMatch(NoMatch {
            requirements: requirements.clone(),
            eliminated_by: FilterStage::Geometry,
            catalog_candidates: 3,
        });

        let PlainSelection::NoMatch(plain) = sanitize(&selection) else {
            unreachable!("expected no match");
        };
        assert_eq!(plain.requirements.required_tolerance, 0.01);
        assert_eq!(plain.requirements.geometry_complexity.as_deref(), Some("complex"));
        assert_eq!(plain.eliminated_by, FilterStage::Geometry);
        assert!(plain.message.contains("relaxing optional filters"));
    }

    #[test]
    fn selection_is_tagged_by_status() {
        let found = sanitize(&MachineSelection::Found(vec![]));
        let json = serde_json::to_value(&found).expect("json");
        assert_eq!(json["status"], "found");
        assert!(json["machines"].as_array().expect("array").is_empty());
    }
}

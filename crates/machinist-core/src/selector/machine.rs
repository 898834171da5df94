//! # Machine Candidate Selector
//!
//! Stage two: find available machines that can cut the chosen material
//! category to the required tolerance, then narrow them with the optional
//! soft filters.
//!
//! ## Filter Order
//!
//! 1. Catalog hard filter: category membership, tolerance, availability
//! 2. Geometry: complexity level → any mapped capability token
//! 3. Surface finish: machine rank ≥ required rank
//! 4. Features: every requested feature present
//!
//! Only step 1 touches the catalog. Steps 2–4 run in memory and are skipped
//! when the corresponding requirement is absent or empty. A whitespace-only
//! requirement is present: it names no known level or token, so it matches
//! only what an unknown value would.
//!
//! Requested tokens (unknown geometry values, features) are normalized the
//! same way catalog list columns are: split on commas and trimmed.

use crate::catalog::{Catalog, MachineQuery};
use crate::decimal::Decimal;
use crate::primitives::{
    DEFAULT_REQUIRED_FINISH, MAX_PARAMETER_LENGTH, MAX_REQUIRED_FEATURES, UNRANKED_FINISH,
    geometry_capabilities, surface_finish_rank,
};
use crate::types::{MachineRecord, MachinistError, split_delimited};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// REQUIREMENTS
// =============================================================================

/// Everything a caller asks of a machine.
///
/// `material_category` must be the coarse category shared with the material
/// catalog ("Superalloy"), not an alloy name ("Waspaloy"). An alloy name is
/// not rejected; it simply matches no machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineRequirements {
    pub material_category: String,
    pub required_tolerance: Decimal,
    pub geometry_complexity: Option<String>,
    pub surface_finish: Option<String>,
    pub required_features: Option<BTreeSet<String>>,
}

impl MachineRequirements {
    #[must_use]
    pub fn new(material_category: impl Into<String>, required_tolerance: Decimal) -> Self {
        Self {
            material_category: material_category.into(),
            required_tolerance,
            geometry_complexity: None,
            surface_finish: None,
            required_features: None,
        }
    }

    #[must_use]
    pub fn with_geometry(mut self, complexity: impl Into<String>) -> Self {
        self.geometry_complexity = Some(complexity.into());
        self
    }

    #[must_use]
    pub fn with_surface_finish(mut self, finish: impl Into<String>) -> Self {
        self.surface_finish = Some(finish.into());
        self
    }

    #[must_use]
    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_features = Some(features.into_iter().map(Into::into).collect());
        self
    }

    /// Reject requests that cannot be evaluated before any query is issued.
    pub fn validate(&self) -> Result<(), MachinistError> {
        if self.material_category.trim().is_empty() {
            return Err(MachinistError::invalid(
                "material_category",
                "must not be empty",
            ));
        }
        let texts = [
            ("material_category", Some(&self.material_category)),
            ("geometry_complexity", self.geometry_complexity.as_ref()),
            ("surface_finish", self.surface_finish.as_ref()),
        ];
        for (parameter, text) in texts {
            if let Some(text) = text
                && text.len() > MAX_PARAMETER_LENGTH
            {
                return Err(MachinistError::invalid(
                    parameter,
                    format!("longer than {} bytes", MAX_PARAMETER_LENGTH),
                ));
            }
        }
        if let Some(features) = &self.required_features {
            if features.len() > MAX_REQUIRED_FEATURES {
                return Err(MachinistError::invalid(
                    "required_features",
                    format!("more than {} features", MAX_REQUIRED_FEATURES),
                ));
            }
            if features.iter().any(|f| f.len() > MAX_PARAMETER_LENGTH) {
                return Err(MachinistError::invalid(
                    "required_features",
                    format!("feature longer than {} bytes", MAX_PARAMETER_LENGTH),
                ));
            }
        }
        Ok(())
    }

    /// Geometry level, if one was given and is not empty.
    #[must_use]
    pub fn geometry(&self) -> Option<&str> {
        non_empty(self.geometry_complexity.as_deref())
    }

    /// Surface finish label, if one was given and is not empty.
    #[must_use]
    pub fn finish(&self) -> Option<&str> {
        non_empty(self.surface_finish.as_deref())
    }

    /// Required features, if any were given.
    #[must_use]
    pub fn features(&self) -> Option<&BTreeSet<String>> {
        self.required_features.as_ref().filter(|f| !f.is_empty())
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.is_empty())
}

// =============================================================================
// RESULT
// =============================================================================

/// The filter that removed the last remaining candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStage {
    /// No machine supports the category at this tolerance, or none is available.
    Catalog,
    Geometry,
    SurfaceFinish,
    Features,
}

impl FilterStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Geometry => "geometry",
            Self::SurfaceFinish => "surface_finish",
            Self::Features => "features",
        }
    }
}

/// Why a machine selection came back empty.
///
/// Carries the exact requirements that produced the empty result so the
/// caller can relax some of them and retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoMatch {
    pub requirements: MachineRequirements,
    pub eliminated_by: FilterStage,
    /// Machines that passed the catalog hard filter.
    pub catalog_candidates: usize,
}

impl fmt::Display for NoMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.requirements;
        let features = r
            .required_features
            .as_ref()
            .map(|set| set.iter().cloned().collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        write!(
            f,
            "No machines found for material_category='{}', tolerance={}mm, \
             geometry='{}', surface_finish='{}', features=[{}]. ",
            r.material_category,
            r.required_tolerance,
            r.geometry_complexity.as_deref().unwrap_or(""),
            r.surface_finish.as_deref().unwrap_or(""),
            features,
        )?;
        match self.eliminated_by {
            FilterStage::Catalog => write!(
                f,
                "No available machine supports this category at this tolerance; \
                 check that the category is a material category, not an alloy name, \
                 or relax the tolerance."
            ),
            stage => write!(
                f,
                "{} machine(s) matched the category and tolerance but none passed the {} filter. \
                 Consider relaxing optional filters and retrying.",
                self.catalog_candidates,
                stage.as_str()
            ),
        }
    }
}

/// Outcome of a machine selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineSelection {
    /// At least one machine satisfies every requirement.
    Found(Vec<MachineRecord>),
    /// Filters were applied and nothing qualified.
    NoMatch(NoMatch),
}

impl MachineSelection {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Matching machines; empty for `NoMatch`.
    #[must_use]
    pub fn machines(&self) -> &[MachineRecord] {
        match self {
            Self::Found(machines) => machines,
            Self::NoMatch(_) => &[],
        }
    }
}

// =============================================================================
// FILTERS
// =============================================================================

/// Geometry rule.
///
/// A known complexity level qualifies a machine that has ANY mapped token.
/// An unknown level must appear as a capability token (case-sensitive).
#[must_use]
pub fn geometry_qualifies(machine: &MachineRecord, level: &str) -> bool {
    match geometry_capabilities(level) {
        Some(tokens) => tokens
            .iter()
            .any(|token| machine.geometry_capability.contains(*token)),
        None => token_present(&machine.geometry_capability, level),
    }
}

/// Surface finish rule: the machine's rank must reach the required rank.
#[must_use]
pub fn finish_qualifies(machine: &MachineRecord, required: &str) -> bool {
    let required_rank = surface_finish_rank(required).unwrap_or(DEFAULT_REQUIRED_FINISH);
    let machine_rank =
        surface_finish_rank(&machine.surface_finish_capability).unwrap_or(UNRANKED_FINISH);
    machine_rank >= required_rank
}

/// Feature rule: every required feature must be present.
#[must_use]
pub fn features_qualify(machine: &MachineRecord, required: &BTreeSet<String>) -> bool {
    required
        .iter()
        .all(|feature| token_present(&machine.special_features, feature))
}

/// Whether a requested value, normalized like a catalog list entry, is in
/// `tokens`. A value that normalizes to nothing is never present.
fn token_present(tokens: &BTreeSet<String>, requested: &str) -> bool {
    let wanted = split_delimited(requested);
    !wanted.is_empty() && wanted.is_subset(tokens)
}

// =============================================================================
// SELECTOR
// =============================================================================

/// Selects machines compatible with a material category and requirements.
pub struct MachineSelector<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: Catalog + ?Sized> MachineSelector<'a, C> {
    #[must_use]
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Run the catalog query and the soft filters.
    ///
    /// Found machines are ordered by id.
    pub fn select(
        &self,
        requirements: &MachineRequirements,
    ) -> Result<MachineSelection, MachinistError> {
        requirements.validate()?;

        let query = MachineQuery {
            material_category: requirements.material_category.clone(),
            max_tolerance: requirements.required_tolerance,
        };
        let mut candidates = self.catalog.query_machines(&query)?;
        candidates.sort_by(|a, b| a.id.cmp(&b.id));

        let catalog_candidates = candidates.len();
        let mut emptied_at = candidates.is_empty().then_some(FilterStage::Catalog);
        let mut apply = |stage: FilterStage, keep: &dyn Fn(&MachineRecord) -> bool| {
            if emptied_at.is_none() {
                candidates.retain(|m| keep(m));
                if candidates.is_empty() {
                    emptied_at = Some(stage);
                }
            }
        };

        if let Some(level) = requirements.geometry() {
            apply(FilterStage::Geometry, &|m| geometry_qualifies(m, level));
        }
        if let Some(finish) = requirements.finish() {
            apply(FilterStage::SurfaceFinish, &|m| finish_qualifies(m, finish));
        }
        if let Some(features) = requirements.features() {
            apply(FilterStage::Features, &|m| features_qualify(m, features));
        }

        Ok(match emptied_at {
            None => MachineSelection::Found(candidates),
            Some(stage) => MachineSelection::NoMatch(NoMatch {
                requirements: requirements.clone(),
                eliminated_by: stage,
                catalog_candidates,
            }),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

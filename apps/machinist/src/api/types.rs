//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Requests carry user-facing values (numbers or numeric text); they are
//! turned into core types here, before any catalog query. Responses carry
//! only sanitized values.

use machinist_core::{
    Decimal, MachineRequirements, MachinistError, PlainMaterial, PlainSelection,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// NUMERIC INPUT
// =============================================================================

/// A numeric request field: a JSON number or text containing one
/// (`"±0.01mm"`, `"650 C"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(serde_json::Number),
    Text(String),
}

impl NumericInput {
    /// Convert to an exact decimal, naming `parameter` on failure.
    pub fn to_decimal(&self, parameter: &str) -> Result<Decimal, MachinistError> {
        let parsed = match self {
            Self::Number(n) => match n.as_i64() {
                Some(int) => Ok(Decimal::from_int(int)),
                None => n
                    .as_f64()
                    .map(Decimal::from_f64)
                    .unwrap_or_else(|| Decimal::parse(&n.to_string())),
            },
            Self::Text(text) => Decimal::extract(text),
        };
        parsed.map_err(|e| MachinistError::from_decimal(parameter, e))
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(Self::Number)
            .unwrap_or_else(|| Self::Text(value.to_string()))
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

// =============================================================================
// HEALTH / STATUS
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Catalog status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub materials: usize,
    pub machines: usize,
    /// BLAKE3 fingerprint of the catalog snapshot.
    pub fingerprint: String,
}

// =============================================================================
// MATERIALS
// =============================================================================

/// Stage one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialsRequest {
    pub min_temperature: NumericInput,
    /// Required: `false` selects only non-aerospace materials.
    pub aerospace_required: bool,
}

/// Stage one response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialsResponse {
    pub success: bool,
    pub materials: Vec<PlainMaterial>,
    pub error: Option<String>,
}

impl MaterialsResponse {
    #[must_use]
    pub fn success(materials: Vec<PlainMaterial>) -> Self {
        Self {
            success: true,
            materials,
            error: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            materials: Vec::new(),
            error: Some(message.into()),
        }
    }
}

// =============================================================================
// MACHINES
// =============================================================================

/// Stage two request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachinesRequest {
    pub material_category: String,
    pub required_tolerance: NumericInput,
    #[serde(default)]
    pub geometry_complexity: Option<String>,
    #[serde(default)]
    pub surface_finish: Option<String>,
    #[serde(default)]
    pub required_features: Option<Vec<String>>,
}

impl MachinesRequest {
    /// Convert to core requirements, validating every field.
    pub fn to_requirements(&self) -> Result<MachineRequirements, MachinistError> {
        let requirements = MachineRequirements {
            material_category: self.material_category.clone(),
            required_tolerance: self.required_tolerance.to_decimal("required_tolerance")?,
            geometry_complexity: self.geometry_complexity.clone(),
            surface_finish: self.surface_finish.clone(),
            required_features: self
                .required_features
                .as_ref()
                .map(|features| features.iter().cloned().collect()),
        };
        requirements.validate()?;
        Ok(requirements)
    }
}

/// Stage two response.
///
/// `selection.status` is `found` or `no_match`; a no-match is a successful
/// call and `message` carries its narration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachinesResponse {
    pub success: bool,
    pub selection: Option<PlainSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: Option<String>,
}

impl MachinesResponse {
    #[must_use]
    pub fn success(selection: PlainSelection) -> Self {
        let message = match &selection {
            PlainSelection::NoMatch(no_match) => Some(no_match.message.clone()),
            PlainSelection::Found { .. } => None,
        };
        Self {
            success: true,
            selection: Some(selection),
            message,
            error: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            selection: None,
            message: None,
            error: Some(message.into()),
        }
    }
}

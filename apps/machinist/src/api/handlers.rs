//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        HealthResponse, MachinesRequest, MachinesResponse, MaterialsRequest, MaterialsResponse,
        StatusResponse,
    },
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use machinist_core::{
    MachineSelection, MachineSelector, MachinistError, MaterialSelector, sanitize,
    snapshot_fingerprint,
};

/// HTTP status for a failed call.
///
/// Bad input is the caller's fault; a failing catalog is an upstream fault.
pub fn error_status(error: &MachinistError) -> StatusCode {
    match error {
        MachinistError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        MachinistError::RetrievalFailed(_) => StatusCode::BAD_GATEWAY,
        MachinistError::SerializationError(_) | MachinistError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Catalog row counts and fingerprint.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.catalog.snapshot().and_then(|snapshot| {
        let counts = snapshot.counts();
        Ok(StatusResponse {
            materials: counts.materials,
            machines: counts.machines,
            fingerprint: snapshot_fingerprint(&snapshot)?,
        })
    });

    match status {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!(event = "status", error = %e, "Status failed");
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

// =============================================================================
// MATERIALS HANDLER
// =============================================================================

/// Stage one: ranked material shortlist.
pub async fn materials_handler(
    State(state): State<AppState>,
    Json(request): Json<MaterialsRequest>,
) -> impl IntoResponse {
    let min_temperature = match request.min_temperature.to_decimal("min_temperature") {
        Ok(value) => value,
        Err(e) => {
            return (error_status(&e), Json(MaterialsResponse::error(e.to_string())));
        }
    };

    match MaterialSelector::new(state.catalog.as_ref())
        .select(min_temperature, request.aerospace_required)
    {
        Ok(materials) => {
            tracing::info!(
                event = "select_materials",
                min_temperature = %min_temperature,
                aerospace_required = request.aerospace_required,
                count = materials.len(),
                "Material selection complete"
            );
            (
                StatusCode::OK,
                Json(MaterialsResponse::success(sanitize(&materials))),
            )
        }
        Err(e) => {
            tracing::error!(event = "select_materials", error = %e, "Material selection failed");
            (error_status(&e), Json(MaterialsResponse::error(e.to_string())))
        }
    }
}

// =============================================================================
// MACHINES HANDLER
// =============================================================================

/// Stage two: compatible machines, or a no-match explanation.
pub async fn machines_handler(
    State(state): State<AppState>,
    Json(request): Json<MachinesRequest>,
) -> impl IntoResponse {
    let requirements = match request.to_requirements() {
        Ok(requirements) => requirements,
        Err(e) => {
            return (error_status(&e), Json(MachinesResponse::error(e.to_string())));
        }
    };

    match MachineSelector::new(state.catalog.as_ref()).select(&requirements) {
        Ok(selection) => {
            match &selection {
                MachineSelection::Found(machines) => tracing::info!(
                    event = "select_machines",
                    material_category = %requirements.material_category,
                    count = machines.len(),
                    "Machine selection complete"
                ),
                MachineSelection::NoMatch(no_match) => tracing::info!(
                    event = "select_machines",
                    material_category = %requirements.material_category,
                    eliminated_by = no_match.eliminated_by.as_str(),
                    catalog_candidates = no_match.catalog_candidates,
                    "Machine selection found no match"
                ),
            }
            (
                StatusCode::OK,
                Json(MachinesResponse::success(sanitize(&selection))),
            )
        }
        Err(e) => {
            tracing::error!(event = "select_machines", error = %e, "Machine selection failed");
            (error_status(&e), Json(MachinesResponse::error(e.to_string())))
        }
    }
}

//! Serialization tests for the HTTP API request/response types.

#![allow(clippy::unwrap_used, clippy::panic)]

use machinist::api::{
    HealthResponse, MachinesRequest, MachinesResponse, MaterialsRequest, MaterialsResponse,
    NumericInput, StatusResponse,
};
use machinist_core::{Decimal, MachinistError, PlainMaterial};
use serde_json::json;

fn dec(text: &str) -> Decimal {
    Decimal::parse(text).unwrap()
}

// =============================================================================
// NUMERIC INPUT
// =============================================================================

#[test]
fn test_numeric_input_accepts_number_and_text() {
    let number: NumericInput = serde_json::from_value(json!(0.05)).unwrap();
    let integer: NumericInput = serde_json::from_value(json!(650)).unwrap();
    let text: NumericInput = serde_json::from_value(json!("±0.05mm")).unwrap();

    assert!(matches!(number, NumericInput::Number(_)));
    assert!(matches!(text, NumericInput::Text(_)));
    assert_eq!(number.to_decimal("t").unwrap(), dec("0.05"));
    assert_eq!(integer.to_decimal("t").unwrap(), dec("650"));
    assert_eq!(text.to_decimal("t").unwrap(), dec("0.05"));
}

#[test]
fn test_numeric_input_failure_names_parameter() {
    let input = NumericInput::from("very tight");

    let err = input.to_decimal("required_tolerance").unwrap_err();

    let MachinistError::ValidationFailed { parameter, .. } = &err else {
        panic!("expected validation failure, got {err:?}");
    };
    assert_eq!(parameter, "required_tolerance");
}

#[test]
fn test_numeric_input_from_f64() {
    assert_eq!(NumericInput::from(1.5).to_decimal("x").unwrap(), dec("1.5"));
}

// =============================================================================
// REQUESTS
// =============================================================================

#[test]
fn test_materials_request_parses_text_temperature() {
    let request: MaterialsRequest = serde_json::from_value(json!({
        "min_temperature": "650 C",
        "aerospace_required": false
    }))
    .unwrap();

    assert!(!request.aerospace_required);
    assert_eq!(request.min_temperature.to_decimal("t").unwrap(), dec("650"));
}

#[test]
fn test_materials_request_missing_aerospace_rejected() {
    let result: Result<MaterialsRequest, _> =
        serde_json::from_value(json!({ "min_temperature": 600 }));

    assert!(result.is_err());
}

#[test]
fn test_machines_request_optionals_default_to_none() {
    let request: MachinesRequest = serde_json::from_value(json!({
        "material_category": "Titanium",
        "required_tolerance": 0.1
    }))
    .unwrap();

    assert!(request.geometry_complexity.is_none());
    assert!(request.surface_finish.is_none());
    assert!(request.required_features.is_none());

    let requirements = request.to_requirements().unwrap();
    assert_eq!(requirements.material_category, "Titanium");
    assert_eq!(requirements.required_tolerance, dec("0.1"));
}

#[test]
fn test_machines_request_features_become_a_set() {
    let request: MachinesRequest = serde_json::from_value(json!({
        "material_category": "Superalloy",
        "required_tolerance": "0.02",
        "required_features": ["probing", "5-axis", "probing"]
    }))
    .unwrap();

    let features = request.to_requirements().unwrap().required_features.unwrap();
    assert_eq!(features.len(), 2);
    assert!(features.contains("5-axis"));
}

#[test]
fn test_machines_request_missing_tolerance_rejected() {
    let result: Result<MachinesRequest, _> =
        serde_json::from_value(json!({ "material_category": "Superalloy" }));

    assert!(result.is_err());
}

// =============================================================================
// RESPONSES
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_status_response_serialization() {
    let status = StatusResponse {
        materials: 3,
        machines: 2,
        fingerprint: "ab".repeat(32),
    };

    let value = serde_json::to_value(&status).unwrap();
    assert_eq!(value["materials"], 3);
    assert_eq!(value["machines"], 2);
}

#[test]
fn test_materials_response_error_has_no_rows() {
    let response = MaterialsResponse::error("Catalog retrieval failed: gone");

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["materials"], json!([]));
    assert_eq!(value["error"], "Catalog retrieval failed: gone");
}

#[test]
fn test_materials_response_roundtrip() {
    let response = MaterialsResponse::success(vec![PlainMaterial {
        name: "Ti-6Al-4V".to_string(),
        category: "Titanium".to_string(),
        grade: "Grade 5".to_string(),
        machinability_rating: 0.22,
        tensile_strength_mpa: 950.0,
        yield_strength_mpa: 880.0,
        max_operating_temp_c: 400.0,
        aerospace_grade: true,
        cost_per_kg: 25.5,
    }]);

    let json = serde_json::to_string(&response).unwrap();
    let back: MaterialsResponse = serde_json::from_str(&json).unwrap();

    assert!(back.success);
    assert_eq!(back.materials, response.materials);
}

#[test]
fn test_machines_response_error_omits_message() {
    let response = MachinesResponse::error("Invalid required_tolerance: empty");

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["success"], false);
    assert!(value["selection"].is_null());
    assert!(value.get("message").is_none());
}

//! # Machinist MCP Server
//!
//! Implements `ServerHandler` with three MCP tools that proxy to the
//! Machinist HTTP API.

use crate::client::{
    ClientError, MachineOutcome, MachinesQuery, MachinistClient, MaterialSummary, MaterialsQuery,
};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::Deserialize;

// =============================================================================
// MCP SERVER
// =============================================================================

/// MCP server that bridges to a Machinist HTTP API.
#[derive(Clone)]
pub struct MachinistMcp {
    client: MachinistClient,
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

// =============================================================================
// TOOL PARAMETER STRUCTS
// =============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MaterialsParams {
    /// Minimum operating temperature in °C.
    #[schemars(description = "Minimum operating temperature in °C, e.g. '650' or '650 C'")]
    pub temperature: String,
    /// Whether the materials must be aerospace grade.
    #[schemars(
        description = "true for aerospace-grade materials only, false for non-aerospace materials only"
    )]
    pub aerospace_required: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MachinesParams {
    /// Material category of the chosen material.
    #[schemars(
        description = "Material category such as 'Superalloy' or 'Titanium'. Use the category field of a material, not its name"
    )]
    pub material_category: String,
    /// Required tolerance in millimetres.
    #[schemars(description = "Required tolerance in mm, e.g. '0.01' or '±0.01mm'")]
    pub required_tolerance: String,
    #[schemars(description = "Geometry complexity: simple, moderate or complex")]
    pub required_geometry: Option<String>,
    #[schemars(description = "Surface finish: standard, high, very high or mirror")]
    pub required_surface_finish: Option<String>,
    #[schemars(description = "Special features every machine must have, e.g. ['5-axis']")]
    pub required_features: Option<Vec<String>>,
}

// =============================================================================
// TOOL IMPLEMENTATIONS
// =============================================================================

#[tool_router]
impl MachinistMcp {
    pub fn new(client: MachinistClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Shortlist up to 5 materials that withstand a minimum operating temperature, hottest first, cheapest on ties. Pass a result's category (not its name) to query_machines"
    )]
    async fn query_materials(
        &self,
        params: Parameters<MaterialsParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let query = MaterialsQuery {
            min_temperature: &p.temperature,
            aerospace_required: p.aerospace_required,
        };
        tool_result(
            self.client
                .materials(&query)
                .await
                .map(|materials| format_materials(&materials)),
        )
    }

    #[tool(
        description = "Find available machines able to cut a material category to a tolerance, optionally filtered by geometry, surface finish and features"
    )]
    async fn query_machines(
        &self,
        params: Parameters<MachinesParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let query = MachinesQuery {
            material_category: &p.material_category,
            required_tolerance: &p.required_tolerance,
            geometry_complexity: p.required_geometry.as_deref(),
            surface_finish: p.required_surface_finish.as_deref(),
            required_features: p.required_features.as_deref(),
        };
        tool_result(
            self.client
                .machines(&query)
                .await
                .map(|outcome| format_machines(&outcome)),
        )
    }

    #[tool(description = "Get catalog status (material count, machine count, fingerprint)")]
    async fn catalog_status(&self) -> Result<CallToolResult, McpError> {
        tool_result(self.client.status().await.map(|status| {
            format!(
                "Catalog Status:\n  Materials: {}\n  Machines: {}\n  Fingerprint: {}",
                status.materials, status.machines, status.fingerprint
            )
        }))
    }
}

/// Refused parameters go back to the agent as a tool error it can act on;
/// transport and server failures are protocol errors.
fn tool_result(result: Result<String, ClientError>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(ClientError::Rejected(reason)) => Ok(CallToolResult::error(vec![Content::text(
            format!("Request failed: {reason}"),
        )])),
        Err(e) => Err(McpError::internal_error(e.to_string(), None)),
    }
}

// =============================================================================
// SERVER HANDLER
// =============================================================================

#[tool_handler]
impl ServerHandler for MachinistMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Machinist material and machine selection. Call query_materials first, \
                 then pass the chosen material's category (not its name) to query_machines."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// =============================================================================
// RESPONSE FORMATTING
// =============================================================================

fn format_materials(materials: &[MaterialSummary]) -> String {
    if materials.is_empty() {
        return "No materials meet the temperature and aerospace requirements.".to_string();
    }

    let mut parts = vec![format!("Materials ({}):", materials.len())];
    for (rank, m) in materials.iter().enumerate() {
        parts.push(format!(
            "  {}. {} [category: {}] max {} °C, {} per kg, machinability {}",
            rank + 1,
            m.name,
            m.category,
            m.max_operating_temp_c,
            m.cost_per_kg,
            m.machinability_rating,
        ));
    }
    parts.join("\n")
}

fn format_machines(outcome: &MachineOutcome) -> String {
    match outcome {
        MachineOutcome::Found { machines } => {
            let mut parts = vec![format!("Machines ({}):", machines.len())];
            for m in machines {
                parts.push(format!(
                    "  {} tolerance {} mm, finish {}, geometry [{}], features [{}]",
                    m.id,
                    m.max_tolerance_mm,
                    m.surface_finish_capability,
                    m.geometry_capability.join(", "),
                    m.special_features.join(", "),
                ));
            }
            parts.join("\n")
        }
        MachineOutcome::NoMatch {
            eliminated_by,
            catalog_candidates,
            message,
        } => format!(
            "{message}\n(eliminated by: {eliminated_by}; {catalog_candidates} catalog candidate(s))"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MachineSummary;

    fn material(name: &str, temp: f64, cost: f64) -> MaterialSummary {
        MaterialSummary {
            name: name.to_string(),
            category: "Superalloy".to_string(),
            max_operating_temp_c: temp,
            cost_per_kg: cost,
            machinability_rating: 0.12,
        }
    }

    #[test]
    fn materials_are_listed_in_rank_order() {
        let text = format_materials(&[
            material("Inconel 718", 700.0, 60.0),
            material("Rene 41", 650.0, 35.0),
        ]);

        assert!(text.starts_with("Materials (2):"));
        assert!(text.contains("1. Inconel 718 [category: Superalloy] max 700 °C, 60 per kg"));
        assert!(text.contains("2. Rene 41"));
    }

    #[test]
    fn empty_materials_say_so() {
        assert!(format_materials(&[]).starts_with("No materials"));
    }

    #[test]
    fn rejected_request_is_tool_error() {
        let result = tool_result(Err(ClientError::Rejected(
            "Invalid required_tolerance: no number in 'tight'".to_string(),
        )))
        .expect("tool result");

        assert_eq!(result.is_error, Some(true));
    }

    #[test]
    fn outage_is_protocol_error() {
        let result = tool_result(Err(ClientError::ServerError(
            502,
            "Catalog retrieval failed".to_string(),
        )));

        assert!(result.is_err());
    }

    #[test]
    fn no_match_returns_narration_and_stage() {
        let text = format_machines(&MachineOutcome::NoMatch {
            eliminated_by: "features".to_string(),
            catalog_candidates: 3,
            message: "No machines found for material_category='Superalloy'".to_string(),
        });

        assert!(text.starts_with("No machines found for material_category='Superalloy'"));
        assert!(text.contains("eliminated by: features; 3 catalog candidate(s)"));
    }

    #[test]
    fn found_machines_list_capabilities() {
        let text = format_machines(&MachineOutcome::Found {
            machines: vec![MachineSummary {
                id: "DMU-50".to_string(),
                max_tolerance_mm: 0.02,
                surface_finish_capability: "mirror".to_string(),
                geometry_capability: vec!["freeform".to_string()],
                special_features: vec!["5-axis".to_string(), "probing".to_string()],
            }],
        });

        assert!(text.contains("DMU-50 tolerance 0.02 mm, finish mirror"));
        assert!(text.contains("features [5-axis, probing]"));
    }
}

//! # Machinist HTTP Client
//!
//! Typed view of the Machinist REST API for the MCP tools.
//!
//! Only the fields the tools render are decoded; anything else in a response
//! body is ignored. A request the server refuses (400 with an `error`
//! envelope, or 422 from a malformed body) becomes [`ClientError::Rejected`]
//! so the tool can hand the reason back to the agent.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Errors from the HTTP client layer.
#[derive(Debug, PartialEq)]
pub enum ClientError {
    /// Cannot reach the Machinist server.
    ConnectionFailed(String),
    /// 401 Unauthorized - invalid or missing API key.
    Unauthorized,
    /// 429 Too Many Requests.
    RateLimited,
    /// The server refused the request parameters.
    Rejected(String),
    /// Server returned a 5xx error (502 when the catalog is unreachable).
    ServerError(u16, String),
    /// Failed to parse response body.
    ParseError(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionFailed(url) => write!(f, "Cannot connect to Machinist at {url}"),
            Self::Unauthorized => write!(f, "Unauthorized: invalid or missing API key"),
            Self::RateLimited => write!(f, "Rate limited: too many requests"),
            Self::Rejected(reason) => write!(f, "Request rejected: {reason}"),
            Self::ServerError(status, msg) => write!(f, "Server error ({status}): {msg}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Body of `POST /materials`.
#[derive(Debug, Serialize)]
pub struct MaterialsQuery<'a> {
    pub min_temperature: &'a str,
    pub aerospace_required: bool,
}

/// Body of `POST /machines`. Absent optionals are sent as `null`.
#[derive(Debug, Serialize)]
pub struct MachinesQuery<'a> {
    pub material_category: &'a str,
    pub required_tolerance: &'a str,
    pub geometry_complexity: Option<&'a str>,
    pub surface_finish: Option<&'a str>,
    pub required_features: Option<&'a [String]>,
}

/// One shortlisted material.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MaterialSummary {
    pub name: String,
    pub category: String,
    pub max_operating_temp_c: f64,
    pub cost_per_kg: f64,
    pub machinability_rating: f64,
}

/// One compatible machine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MachineSummary {
    pub id: String,
    pub max_tolerance_mm: f64,
    #[serde(default)]
    pub surface_finish_capability: String,
    #[serde(default)]
    pub geometry_capability: Vec<String>,
    #[serde(default)]
    pub special_features: Vec<String>,
}

/// Outcome of a machine search, tagged by `status` on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MachineOutcome {
    Found {
        machines: Vec<MachineSummary>,
    },
    NoMatch {
        /// Filter stage that removed the last candidate, e.g. `surface_finish`.
        eliminated_by: String,
        catalog_candidates: usize,
        /// Server-rendered narration of the failed requirements.
        message: String,
    },
}

/// Row counts and fingerprint from `GET /status`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogStatus {
    pub materials: usize,
    pub machines: usize,
    pub fingerprint: String,
}

#[derive(Debug, Deserialize)]
struct MaterialsReply {
    success: bool,
    #[serde(default)]
    materials: Vec<MaterialSummary>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MachinesReply {
    success: bool,
    selection: Option<MachineOutcome>,
    error: Option<String>,
}

/// Error envelope the API returns alongside a 400.
#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: Option<String>,
}

fn refused(error: Option<String>) -> ClientError {
    ClientError::Rejected(error.unwrap_or_else(|| "no reason given".to_string()))
}

/// Map a status and body to a decoded value or a [`ClientError`].
fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ClientError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ClientError::RateLimited);
    }
    if status.is_server_error() {
        return Err(ClientError::ServerError(status.as_u16(), body.to_string()));
    }
    if status.is_client_error() {
        // Extractor rejections (422) are plain text, not the JSON envelope.
        let reason = serde_json::from_str::<ErrorReply>(body)
            .ok()
            .and_then(|reply| reply.error)
            .unwrap_or_else(|| body.trim().to_string());
        return Err(ClientError::Rejected(reason));
    }
    serde_json::from_str(body).map_err(|e| ClientError::ParseError(e.to_string()))
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client that wraps calls to the Machinist REST API.
#[derive(Clone)]
pub struct MachinistClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl MachinistClient {
    /// Create a new client pointing at the given Machinist server URL.
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let resp = req
            .send()
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("{}: {e}", self.base_url)))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        decode(status, &body)
    }

    /// GET /status
    pub async fn status(&self) -> Result<CatalogStatus, ClientError> {
        self.call(self.request(reqwest::Method::GET, "/status"))
            .await
    }

    /// POST /materials → ranked shortlist, hottest first.
    pub async fn materials(
        &self,
        query: &MaterialsQuery<'_>,
    ) -> Result<Vec<MaterialSummary>, ClientError> {
        let reply: MaterialsReply = self
            .call(self.request(reqwest::Method::POST, "/materials").json(query))
            .await?;
        if reply.success {
            Ok(reply.materials)
        } else {
            Err(refused(reply.error))
        }
    }

    /// POST /machines → compatible machines or the no-match narration.
    pub async fn machines(&self, query: &MachinesQuery<'_>) -> Result<MachineOutcome, ClientError> {
        let reply: MachinesReply = self
            .call(self.request(reqwest::Method::POST, "/machines").json(query))
            .await?;
        if !reply.success {
            return Err(refused(reply.error));
        }
        reply
            .selection
            .ok_or_else(|| ClientError::ParseError("reply carries no selection".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unauthorized_and_rate_limited_are_distinct() {
        let auth: Result<CatalogStatus, _> = decode(StatusCode::UNAUTHORIZED, "");
        let limited: Result<CatalogStatus, _> = decode(StatusCode::TOO_MANY_REQUESTS, "");

        assert_eq!(auth, Err(ClientError::Unauthorized));
        assert_eq!(limited, Err(ClientError::RateLimited));
    }

    #[test]
    fn bad_request_carries_envelope_error() {
        let body = json!({
            "success": false,
            "selection": null,
            "error": "Invalid required_tolerance: no number in 'tight'"
        })
        .to_string();

        let result: Result<CatalogStatus, _> = decode(StatusCode::BAD_REQUEST, &body);

        assert_eq!(
            result,
            Err(ClientError::Rejected(
                "Invalid required_tolerance: no number in 'tight'".to_string()
            ))
        );
    }

    #[test]
    fn unprocessable_plain_text_is_rejected() {
        let result: Result<CatalogStatus, _> = decode(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Failed to deserialize the JSON body: missing field `aerospace_required`\n",
        );

        assert_eq!(
            result,
            Err(ClientError::Rejected(
                "Failed to deserialize the JSON body: missing field `aerospace_required`"
                    .to_string()
            ))
        );
    }

    #[test]
    fn catalog_outage_is_server_error() {
        let result: Result<CatalogStatus, _> =
            decode(StatusCode::BAD_GATEWAY, "Catalog retrieval failed");

        assert_eq!(
            result,
            Err(ClientError::ServerError(
                502,
                "Catalog retrieval failed".to_string()
            ))
        );
    }

    #[test]
    fn unreadable_body_is_parse_error() {
        let result: Result<CatalogStatus, _> = decode(StatusCode::OK, "<html>");
        assert!(matches!(result, Err(ClientError::ParseError(_))));
    }

    #[test]
    fn no_match_decodes_narration() {
        let body = json!({
            "success": true,
            "selection": {
                "status": "no_match",
                "requirements": { "material_category": "Superalloy", "required_tolerance": 0.01 },
                "eliminated_by": "surface_finish",
                "catalog_candidates": 2,
                "message": "No machines found for material_category='Superalloy'"
            },
            "message": "No machines found for material_category='Superalloy'",
            "error": null
        })
        .to_string();

        let reply: MachinesReply = decode(StatusCode::OK, &body).expect("decode");

        assert!(reply.success);
        assert_eq!(
            reply.selection,
            Some(MachineOutcome::NoMatch {
                eliminated_by: "surface_finish".to_string(),
                catalog_candidates: 2,
                message: "No machines found for material_category='Superalloy'".to_string(),
            })
        );
    }

    #[test]
    fn found_machines_ignore_unrendered_fields() {
        let body = json!({
            "status": "found",
            "machines": [{
                "id": "DMU-50",
                "supported_material_categories": ["Superalloy"],
                "max_tolerance_mm": 0.02,
                "geometry_capability": ["freeform"],
                "surface_finish_capability": "mirror",
                "special_features": ["5-axis"],
                "status": "available"
            }]
        })
        .to_string();

        let outcome: MachineOutcome = decode(StatusCode::OK, &body).expect("decode");

        assert_eq!(
            outcome,
            MachineOutcome::Found {
                machines: vec![MachineSummary {
                    id: "DMU-50".to_string(),
                    max_tolerance_mm: 0.02,
                    surface_finish_capability: "mirror".to_string(),
                    geometry_capability: vec!["freeform".to_string()],
                    special_features: vec!["5-axis".to_string()],
                }]
            }
        );
    }

    #[test]
    fn machines_query_sends_absent_optionals_as_null() {
        let features = vec!["5-axis".to_string()];
        let query = MachinesQuery {
            material_category: "Titanium",
            required_tolerance: "±0.05mm",
            geometry_complexity: None,
            surface_finish: Some("high"),
            required_features: Some(&features),
        };

        let value = serde_json::to_value(&query).expect("serialize");

        assert!(value["geometry_complexity"].is_null());
        assert_eq!(value["surface_finish"], "high");
        assert_eq!(value["required_features"], json!(["5-axis"]));
    }

    #[test]
    fn materials_query_always_sends_aerospace_flag() {
        let query = MaterialsQuery {
            min_temperature: "650 C",
            aerospace_required: false,
        };

        let value = serde_json::to_value(&query).expect("serialize");

        assert_eq!(value["aerospace_required"], false);
    }
}

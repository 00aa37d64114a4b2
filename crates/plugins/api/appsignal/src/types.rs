//! AppSignal API response types.
//!
//! Payloads are passed through to the agent mostly untouched, so every
//! type keeps the fields it does not name in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Apps
// =============================================================================

/// An AppSignal application (one environment of one app).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// Incidents
// =============================================================================

/// An exception incident: one error class grouped across samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionIncident {
    pub number: u64,
    #[serde(default)]
    pub exception_name: Option<String>,
    #[serde(default)]
    pub exception_message: Option<String>,
    #[serde(default)]
    pub action_names: Vec<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub last_occurred_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A performance incident: one slow action grouped across samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceIncident {
    pub number: u64,
    #[serde(default)]
    pub action_names: Vec<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub last_occurred_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Envelope of the incident listing endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct IncidentList<T> {
    #[serde(default = "Vec::new")]
    pub incidents: Vec<T>,
}

/// Query for incident listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentQuery {
    /// `open`, `closed` or `wip`; omitted means the API default
    pub state: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl IncidentQuery {
    /// Query string pairs, skipping unset fields.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(state) = &self.state {
            params.push(("state", state.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset", offset.to_string()));
        }
        params
    }
}

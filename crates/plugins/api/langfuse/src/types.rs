//! Langfuse public API types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A trace. Detail responses carry observations and scores in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub input: Option<Value>,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A span, generation or event inside a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub id: String,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default, rename = "type")]
    pub observation_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub input: Option<Value>,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Paging metadata of list endpoints. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// Filters for `GET /api/public/traces`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub from_timestamp: Option<String>,
    pub to_timestamp: Option<String>,
}

impl TraceQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = paging(self.page, self.limit);
        push(&mut params, "name", &self.name);
        push(&mut params, "userId", &self.user_id);
        push(&mut params, "sessionId", &self.session_id);
        push(&mut params, "fromTimestamp", &self.from_timestamp);
        push(&mut params, "toTimestamp", &self.to_timestamp);
        params
    }
}

/// Filters for `GET /api/public/observations`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub trace_id: Option<String>,
    pub observation_type: Option<String>,
    pub name: Option<String>,
}

impl ObservationQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = paging(self.page, self.limit);
        push(&mut params, "traceId", &self.trace_id);
        push(&mut params, "type", &self.observation_type);
        push(&mut params, "name", &self.name);
        params
    }
}

fn paging(page: Option<u32>, limit: Option<u32>) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(page) = page {
        params.push(("page", page.to_string()));
    }
    if let Some(limit) = limit {
        params.push(("limit", limit.to_string()));
    }
    params
}

fn push(params: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<String>) {
    if let Some(v) = value {
        params.push((key, v.clone()));
    }
}

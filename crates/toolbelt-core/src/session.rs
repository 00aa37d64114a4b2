//! Per-server session context shared by tool handlers.
//!
//! Holds named selections such as the currently selected AppSignal app.
//! The server handles one request at a time, so a selection made by one
//! tool call is visible to every later call.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::Value;
use tracing::info;

use crate::{Error, Result};

/// Session state for one running server.
#[derive(Debug, Default)]
pub struct Session {
    selections: RwLock<BTreeMap<String, String>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a selection already made (e.g. from an env var).
    pub fn with_selection(self, kind: impl Into<String>, id: Option<String>) -> Self {
        if let Some(id) = id {
            self.select(kind, id);
        }
        self
    }

    /// Record a selection, replacing any previous one of the same kind.
    pub fn select(&self, kind: impl Into<String>, id: impl Into<String>) {
        let kind = kind.into();
        let id = id.into();
        info!(kind = %kind, id = %id, "Selection changed");
        self.selections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(kind, id);
    }

    /// Current selection of a kind.
    pub fn selected(&self, kind: &str) -> Option<String> {
        self.selections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(kind)
            .cloned()
    }

    /// Use `explicit` if given, else the current selection, else fail with `hint`.
    pub fn resolve(&self, kind: &str, explicit: Option<&str>, hint: &str) -> Result<String> {
        if let Some(id) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
            return Ok(id.to_string());
        }
        self.selected(kind)
            .ok_or_else(|| Error::InvalidInput(hint.to_string()))
    }

    /// All selections as a JSON object.
    pub fn snapshot(&self) -> Value {
        let selections = self
            .selections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Value::Object(
            selections
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

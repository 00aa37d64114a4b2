//! Output pipeline for tool results.
//!
//! Tool handlers return JSON values; the pipeline shrinks them before they
//! reach the LLM:
//!
//! - **Truncation**: long string fields are cut to a preview and spilled to disk
//! - **Rendering**: the result is pretty-printed JSON
//! - **Hints**: paginated listings get a note telling the agent how to fetch more
//!
//! # Example
//!
//! ```ignore
//! use toolbelt_pipeline::{Pipeline, Truncator};
//!
//! let pipeline = Pipeline::new().with_truncator(Truncator::default());
//! let output = pipeline.transform(serde_json::json!({"input": long_text}))?;
//! println!("{}", output.to_string_with_hints());
//! ```

pub mod truncation;

pub use truncation::Truncator;

use serde::Serialize;
use serde_json::Value;
use toolbelt_core::Result;

/// Output from a pipeline transformation.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Rendered JSON
    pub content: String,
    /// Hint for the agent about further pages
    pub agent_hint: Option<String>,
}

impl TransformOutput {
    pub fn new(content: String) -> Self {
        Self {
            content,
            agent_hint: None,
        }
    }

    /// Attach an agent hint.
    pub fn with_hint(mut self, hint: Option<String>) -> Self {
        self.agent_hint = hint;
        self
    }

    /// Final text including any hint.
    pub fn to_string_with_hints(&self) -> String {
        match &self.agent_hint {
            Some(hint) => format!("{}\n\n{}", self.content, hint),
            None => self.content.clone(),
        }
    }
}

/// Pipeline turning tool results into text.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    truncator: Option<Truncator>,
}

impl Pipeline {
    /// Pipeline that only renders; no truncation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable large-field truncation.
    pub fn with_truncator(mut self, truncator: Truncator) -> Self {
        self.truncator = Some(truncator);
        self
    }

    pub fn truncator(&self) -> Option<&Truncator> {
        self.truncator.as_ref()
    }

    /// Truncate (if enabled) and render a JSON value.
    pub fn transform(&self, value: Value) -> Result<TransformOutput> {
        let value = match &self.truncator {
            Some(truncator) => truncator.truncate(value)?,
            None => value,
        };
        Ok(TransformOutput::new(serde_json::to_string_pretty(&value)?))
    }

    /// Serialize then transform.
    pub fn transform_serializable<T: Serialize>(&self, value: &T) -> Result<TransformOutput> {
        self.transform(serde_json::to_value(value)?)
    }
}

/// Hint for page-numbered listings (1-based pages).
///
/// Returns `None` on the last page or when the total is unknown.
pub fn page_hint(item_type: &str, page: u32, total_pages: Option<u32>) -> Option<String> {
    let total = total_pages?;
    if page >= total {
        return None;
    }
    Some(format!(
        "Showing page {}/{} of {}. Use `page={}` for the next page.",
        page,
        total,
        item_type,
        page + 1
    ))
}

/// Hint for offset-based listings.
///
/// A full page suggests more records may follow. No hint when the next
/// offset would not fit in a `u32`.
pub fn offset_hint(item_type: &str, offset: u32, limit: u32, returned: usize) -> Option<String> {
    if limit == 0 || returned < limit as usize {
        return None;
    }
    let next = offset.checked_add(limit)?;
    Some(format!(
        "Showing {} {} from offset {}. More may be available: use `offset={}` and `limit={}`.",
        returned, item_type, offset, next, limit
    ))
}

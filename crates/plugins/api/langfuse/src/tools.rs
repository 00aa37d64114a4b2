//! Langfuse tools.
//!
//! Trace and observation payloads often carry whole prompts and completions,
//! so the registry renders them through a truncating pipeline.

use schemars::JsonSchema;
use serde::Deserialize;
use toolbelt_core::{Error, Result};
use toolbelt_mcp::tool::{check_limit, check_not_blank};
use toolbelt_mcp::{ToolContext, ToolDescriptor, ToolInput, ToolOutput};
use toolbelt_pipeline::page_hint;

use crate::client::LangfuseApi;
use crate::types::{ObservationQuery, PageMeta, TraceQuery};
use crate::{GROUP_OBSERVATIONS, GROUP_TRACES};

type Ctx = ToolContext<dyn LangfuseApi>;

const MAX_LIMIT: u32 = 100;

pub fn all_tools() -> Vec<ToolDescriptor<dyn LangfuseApi>> {
    vec![
        get_traces_tool(),
        get_trace_detail_tool(),
        get_observations_tool(),
        get_observation_tool(),
    ]
}

fn check_page(page: Option<u32>) -> Result<()> {
    if page == Some(0) {
        return Err(Error::InvalidInput("page starts at 1".to_string()));
    }
    Ok(())
}

fn check_optional_not_blank(field: &str, value: &Option<String>) -> Result<()> {
    match value {
        Some(v) => check_not_blank(field, v),
        None => Ok(()),
    }
}

fn listing_hint(item_type: &str, meta: &PageMeta) -> Option<String> {
    page_hint(item_type, meta.page, Some(meta.total_pages))
}

// =============================================================================
// Traces
// =============================================================================

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListTracesArgs {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Traces per page (1-100)
    pub limit: Option<u32>,
    /// Only traces with this name
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    /// ISO 8601 lower bound on the trace timestamp
    pub from_timestamp: Option<String>,
    /// ISO 8601 upper bound on the trace timestamp
    pub to_timestamp: Option<String>,
}

impl ToolInput for ListTracesArgs {
    fn validate(&self) -> Result<()> {
        check_page(self.page)?;
        check_limit("limit", self.limit, MAX_LIMIT)?;
        check_optional_not_blank("name", &self.name)?;
        check_optional_not_blank("user_id", &self.user_id)?;
        check_optional_not_blank("session_id", &self.session_id)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TraceIdArgs {
    pub trace_id: String,
}

impl ToolInput for TraceIdArgs {
    fn validate(&self) -> Result<()> {
        check_not_blank("trace_id", &self.trace_id)
    }
}

pub fn get_traces_tool() -> ToolDescriptor<dyn LangfuseApi> {
    ToolDescriptor::new(
        "get_traces",
        GROUP_TRACES,
        "List Langfuse traces, newest first, filtered by name, user, session or time range.",
        get_traces,
    )
}

async fn get_traces(ctx: Ctx, args: ListTracesArgs) -> Result<ToolOutput> {
    let query = TraceQuery {
        page: args.page,
        limit: args.limit,
        name: args.name,
        user_id: args.user_id,
        session_id: args.session_id,
        from_timestamp: args.from_timestamp,
        to_timestamp: args.to_timestamp,
    };
    let page = ctx.client.list_traces(query).await?;
    let hint = listing_hint("traces", &page.meta);
    Ok(ToolOutput::json(&page)?.with_hint(hint))
}

pub fn get_trace_detail_tool() -> ToolDescriptor<dyn LangfuseApi> {
    ToolDescriptor::new(
        "get_trace_detail",
        GROUP_TRACES,
        "Get one trace with its observations and scores. Long fields are truncated to a preview.",
        get_trace_detail,
    )
}

async fn get_trace_detail(ctx: Ctx, args: TraceIdArgs) -> Result<ToolOutput> {
    let trace = ctx.client.get_trace(args.trace_id.trim()).await?;
    ToolOutput::json(&trace)
}

// =============================================================================
// Observations
// =============================================================================

/// Observation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObservationType {
    Span,
    Generation,
    Event,
}

impl ObservationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationType::Span => "SPAN",
            ObservationType::Generation => "GENERATION",
            ObservationType::Event => "EVENT",
        }
    }
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListObservationsArgs {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Observations per page (1-100)
    pub limit: Option<u32>,
    /// Only observations of this trace
    pub trace_id: Option<String>,
    #[serde(rename = "type")]
    pub observation_type: Option<ObservationType>,
    pub name: Option<String>,
}

impl ToolInput for ListObservationsArgs {
    fn validate(&self) -> Result<()> {
        check_page(self.page)?;
        check_limit("limit", self.limit, MAX_LIMIT)?;
        check_optional_not_blank("trace_id", &self.trace_id)?;
        check_optional_not_blank("name", &self.name)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ObservationIdArgs {
    pub observation_id: String,
}

impl ToolInput for ObservationIdArgs {
    fn validate(&self) -> Result<()> {
        check_not_blank("observation_id", &self.observation_id)
    }
}

pub fn get_observations_tool() -> ToolDescriptor<dyn LangfuseApi> {
    ToolDescriptor::new(
        "get_observations",
        GROUP_OBSERVATIONS,
        "List observations (spans, generations, events), optionally for one trace.",
        get_observations,
    )
}

async fn get_observations(ctx: Ctx, args: ListObservationsArgs) -> Result<ToolOutput> {
    let query = ObservationQuery {
        page: args.page,
        limit: args.limit,
        trace_id: args.trace_id,
        observation_type: args.observation_type.map(|t| t.as_str().to_string()),
        name: args.name,
    };
    let page = ctx.client.list_observations(query).await?;
    let hint = listing_hint("observations", &page.meta);
    Ok(ToolOutput::json(&page)?.with_hint(hint))
}

pub fn get_observation_tool() -> ToolDescriptor<dyn LangfuseApi> {
    ToolDescriptor::new(
        "get_observation",
        GROUP_OBSERVATIONS,
        "Get one observation by ID. Long fields are truncated to a preview.",
        get_observation,
    )
}

async fn get_observation(ctx: Ctx, args: ObservationIdArgs) -> Result<ToolOutput> {
    let observation = ctx
        .client
        .get_observation(args.observation_id.trim())
        .await?;
    ToolOutput::json(&observation)
}

//! AppSignal tools.

use schemars::JsonSchema;
use serde::Deserialize;
use toolbelt_core::{Result, Scan};
use toolbelt_mcp::tool::{check_limit, check_not_blank};
use toolbelt_mcp::{NoArgs, ToolContext, ToolDescriptor, ToolInput, ToolOutput};
use toolbelt_pipeline::offset_hint;

use crate::client::{find_exception_incident, find_performance_incident, AppSignalApi};
use crate::types::IncidentQuery;
use crate::{APP_SELECTION, GROUP_APPS, GROUP_INCIDENTS};

type Ctx = ToolContext<dyn AppSignalApi>;

const DEFAULT_LIMIT: u32 = 25;
const MAX_LIMIT: u32 = 100;

const NO_APP_SELECTED: &str = "No app selected. Call select_app_id first or pass app_id.";

/// Every AppSignal tool, in listing order.
pub fn all_tools() -> Vec<ToolDescriptor<dyn AppSignalApi>> {
    vec![
        get_apps_tool(),
        select_app_id_tool(),
        get_exception_incidents_tool(),
        get_exception_incident_tool(),
        get_performance_incidents_tool(),
        get_performance_incident_tool(),
    ]
}

// =============================================================================
// Inputs
// =============================================================================

/// Incident workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IncidentState {
    Open,
    Closed,
    Wip,
}

impl IncidentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentState::Open => "open",
            IncidentState::Closed => "closed",
            IncidentState::Wip => "wip",
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SelectAppArgs {
    /// App ID as returned by get_apps
    pub app_id: String,
}

impl ToolInput for SelectAppArgs {
    fn validate(&self) -> Result<()> {
        check_not_blank("app_id", &self.app_id)
    }
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListIncidentsArgs {
    /// App ID; defaults to the selected app
    pub app_id: Option<String>,
    /// Only incidents in this state
    pub state: Option<IncidentState>,
    /// Page size (1-100, default 25)
    pub limit: Option<u32>,
    /// Number of incidents to skip
    pub offset: Option<u32>,
}

impl ToolInput for ListIncidentsArgs {
    fn validate(&self) -> Result<()> {
        check_limit("limit", self.limit, MAX_LIMIT)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetIncidentArgs {
    /// App ID; defaults to the selected app
    pub app_id: Option<String>,
    /// Incident number shown in AppSignal
    pub incident_number: u64,
}

impl ToolInput for GetIncidentArgs {}

fn resolve_app(ctx: &Ctx, explicit: Option<&str>) -> Result<String> {
    ctx.session.resolve(APP_SELECTION, explicit, NO_APP_SELECTED)
}

// =============================================================================
// Apps
// =============================================================================

pub fn get_apps_tool() -> ToolDescriptor<dyn AppSignalApi> {
    ToolDescriptor::new(
        "get_apps",
        GROUP_APPS,
        "List AppSignal applications with their IDs and environments.",
        get_apps,
    )
}

async fn get_apps(ctx: Ctx, _: NoArgs) -> Result<ToolOutput> {
    let apps = ctx.client.list_apps().await?;
    ToolOutput::json(&apps)
}

pub fn select_app_id_tool() -> ToolDescriptor<dyn AppSignalApi> {
    ToolDescriptor::new(
        "select_app_id",
        GROUP_APPS,
        "Select the app used by incident tools when no app_id is passed.",
        select_app_id,
    )
}

async fn select_app_id(ctx: Ctx, args: SelectAppArgs) -> Result<ToolOutput> {
    let app_id = args.app_id.trim().to_string();
    ctx.session.select(APP_SELECTION, app_id.clone());
    Ok(ToolOutput::text(format!(
        "Selected app {}. Incident tools will use it when app_id is omitted.",
        app_id
    )))
}

// =============================================================================
// Incidents
// =============================================================================

fn incident_query(args: &ListIncidentsArgs) -> IncidentQuery {
    IncidentQuery {
        state: args.state.map(|s| s.as_str().to_string()),
        limit: Some(args.limit.unwrap_or(DEFAULT_LIMIT)),
        offset: Some(args.offset.unwrap_or(0)),
    }
}

fn listing_hint(item_type: &str, query: &IncidentQuery, returned: usize) -> Option<String> {
    offset_hint(
        item_type,
        query.offset.unwrap_or(0),
        query.limit.unwrap_or(DEFAULT_LIMIT),
        returned,
    )
}

pub fn get_exception_incidents_tool() -> ToolDescriptor<dyn AppSignalApi> {
    ToolDescriptor::new(
        "get_exception_incidents",
        GROUP_INCIDENTS,
        "List exception incidents of an app, optionally filtered by state.",
        get_exception_incidents,
    )
}

async fn get_exception_incidents(ctx: Ctx, args: ListIncidentsArgs) -> Result<ToolOutput> {
    let app_id = resolve_app(&ctx, args.app_id.as_deref())?;
    let query = incident_query(&args);
    let incidents = ctx
        .client
        .list_exception_incidents(&app_id, query.clone())
        .await?;
    let hint = listing_hint("exception incidents", &query, incidents.len());
    Ok(ToolOutput::json(&incidents)?.with_hint(hint))
}

pub fn get_exception_incident_tool() -> ToolDescriptor<dyn AppSignalApi> {
    ToolDescriptor::new(
        "get_exception_incident",
        GROUP_INCIDENTS,
        "Get one exception incident by its number.",
        get_exception_incident,
    )
}

async fn get_exception_incident(ctx: Ctx, args: GetIncidentArgs) -> Result<ToolOutput> {
    let app_id = resolve_app(&ctx, args.app_id.as_deref())?;
    let incident = find_exception_incident(
        ctx.client.as_ref(),
        &app_id,
        args.incident_number,
        Scan::default(),
    )
    .await?;
    ToolOutput::json(&incident)
}

pub fn get_performance_incidents_tool() -> ToolDescriptor<dyn AppSignalApi> {
    ToolDescriptor::new(
        "get_performance_incidents",
        GROUP_INCIDENTS,
        "List performance incidents of an app, optionally filtered by state.",
        get_performance_incidents,
    )
}

async fn get_performance_incidents(ctx: Ctx, args: ListIncidentsArgs) -> Result<ToolOutput> {
    let app_id = resolve_app(&ctx, args.app_id.as_deref())?;
    let query = incident_query(&args);
    let incidents = ctx
        .client
        .list_performance_incidents(&app_id, query.clone())
        .await?;
    let hint = listing_hint("performance incidents", &query, incidents.len());
    Ok(ToolOutput::json(&incidents)?.with_hint(hint))
}

pub fn get_performance_incident_tool() -> ToolDescriptor<dyn AppSignalApi> {
    ToolDescriptor::new(
        "get_performance_incident",
        GROUP_INCIDENTS,
        "Get one performance incident by its number.",
        get_performance_incident,
    )
}

async fn get_performance_incident(ctx: Ctx, args: GetIncidentArgs) -> Result<ToolOutput> {
    let app_id = resolve_app(&ctx, args.app_id.as_deref())?;
    let incident = find_performance_incident(
        ctx.client.as_ref(),
        &app_id,
        args.incident_number,
        Scan::default(),
    )
    .await?;
    ToolOutput::json(&incident)
}

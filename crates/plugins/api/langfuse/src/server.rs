//! Langfuse server bootstrap.

use std::sync::Arc;

use toolbelt_core::{EnvSource, Result, Session};
use toolbelt_mcp::{McpServer, ResourceDescriptor, ResourceRegistry, ToolRegistry};
use toolbelt_pipeline::Pipeline;
use tracing::info;

use crate::client::{LangfuseApi, LangfuseClient};
use crate::config::LangfuseConfig;
use crate::tools::all_tools;

pub const CONFIG_URI: &str = "langfuse://config";

const INSTRUCTIONS: &str = "Use get_traces to find traces, then get_trace_detail or \
get_observations for their contents. Long fields are shortened to a preview that names \
a local file holding the full text.";

/// Build the Langfuse server from environment variables.
pub fn build_server(env: &dyn EnvSource) -> Result<McpServer> {
    let config = LangfuseConfig::from_env(env)?;
    let client = LangfuseClient::new(
        &config.base_url,
        &config.public_key,
        &config.secret_key,
        config.timeout,
    )?;
    Ok(assemble(config, Arc::new(client)))
}

pub(crate) fn assemble(config: LangfuseConfig, client: Arc<dyn LangfuseApi>) -> McpServer {
    let pipeline = Pipeline::new().with_truncator(config.truncator());

    let tools = ToolRegistry::new(client, Arc::new(Session::new()))
        .with_filter(config.filter.clone())
        .with_pipeline(pipeline)
        .register_all(all_tools());

    info!(
        base_url = %config.base_url,
        threshold = config.truncate_threshold,
        spill_dir = %config.spill_dir.display(),
        tools = ?tools.names(),
        "Langfuse server configured"
    );

    let resources = ResourceRegistry::new().with(config_resource(config));

    McpServer::new("toolbelt-langfuse", env!("CARGO_PKG_VERSION"), tools)
        .with_resources(resources)
        .with_instructions(INSTRUCTIONS)
}

/// The `langfuse://config` resource.
pub fn config_resource(config: LangfuseConfig) -> ResourceDescriptor {
    ResourceDescriptor::json(CONFIG_URI, "Langfuse configuration", move || {
        Ok(config.describe())
    })
    .with_description("Active Langfuse settings and truncation options. Keys are redacted.")
}

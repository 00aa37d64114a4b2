//! AppSignal server bootstrap.

use std::sync::Arc;

use toolbelt_core::{EnvSource, Result, Session};
use toolbelt_mcp::{McpServer, ResourceDescriptor, ResourceRegistry, ToolRegistry};
use tracing::info;

use crate::client::{AppSignalApi, AppSignalClient};
use crate::config::AppSignalConfig;
use crate::tools::all_tools;
use crate::APP_SELECTION;

pub const CONFIG_URI: &str = "appsignal://config";

const INSTRUCTIONS: &str = "Call get_apps to find an app, then select_app_id to make it the \
default for incident tools. Incident numbers are the ones shown in the AppSignal UI.";

/// Build the AppSignal server from environment variables.
pub fn build_server(env: &dyn EnvSource) -> Result<McpServer> {
    let config = AppSignalConfig::from_env(env)?;
    let client = AppSignalClient::new(&config.base_url, &config.api_key, config.timeout)?;
    Ok(assemble(config, Arc::new(client)))
}

/// Wire a server around any client implementation.
pub(crate) fn assemble(config: AppSignalConfig, client: Arc<dyn AppSignalApi>) -> McpServer {
    let session = Arc::new(Session::new().with_selection(APP_SELECTION, config.app_id.clone()));

    let tools = ToolRegistry::new(client, Arc::clone(&session))
        .with_filter(config.filter.clone())
        .register_all(all_tools());

    info!(
        base_url = %config.base_url,
        tools = ?tools.names(),
        "AppSignal server configured"
    );

    let resources = ResourceRegistry::new().with(config_resource(config, session));

    McpServer::new("toolbelt-appsignal", env!("CARGO_PKG_VERSION"), tools)
        .with_resources(resources)
        .with_instructions(INSTRUCTIONS)
}

/// The `appsignal://config` resource.
pub fn config_resource(config: AppSignalConfig, session: Arc<Session>) -> ResourceDescriptor {
    ResourceDescriptor::json(CONFIG_URI, "AppSignal configuration", move || {
        Ok(config.describe(&session))
    })
    .with_description("Active AppSignal settings and selected app. Secrets are redacted.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockAppSignalApi;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use toolbelt_mcp::protocol::{JsonRpcRequest, RequestId, JSONRPC_VERSION};

    fn config(pairs: &[(&str, &str)]) -> AppSignalConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppSignalConfig::from_env(&env).unwrap()
    }

    fn request(id: i64, method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: RequestId::Number(id),
            method: method.to_string(),
            params: Some(params),
        }
    }

    #[test]
    fn test_build_server_requires_api_key() {
        let env: HashMap<String, String> = HashMap::new();
        assert!(build_server(&env).is_err());
    }

    #[test]
    fn test_build_server_registers_all_tools() {
        let env: HashMap<String, String> =
            HashMap::from([("APPSIGNAL_API_KEY".to_string(), "secret".to_string())]);
        let server = build_server(&env).unwrap();
        assert_eq!(server.tools().definitions().len(), 6);
        assert_eq!(server.info().name, "toolbelt-appsignal");
    }

    #[tokio::test]
    async fn test_filtered_tools_hidden() {
        let cfg = config(&[
            ("APPSIGNAL_API_KEY", "secret"),
            ("APPSIGNAL_ENABLED_TOOLGROUPS", "apps"),
        ]);
        let mut server = assemble(cfg, Arc::new(MockAppSignalApi::new()));

        let names: Vec<String> = server
            .tools()
            .definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["get_apps", "select_app_id"]);

        let resp = server
            .handle_request(request(
                1,
                "tools/call",
                json!({"name": "get_exception_incidents", "arguments": {"app_id": "a1"}}),
            ))
            .await;
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(
            result["content"][0]["text"],
            "Unknown tool: get_exception_incidents"
        );
    }

    #[tokio::test]
    async fn test_config_resource_tracks_selection() {
        let cfg = config(&[("APPSIGNAL_API_KEY", "secret"), ("APPSIGNAL_APP_ID", "a1")]);
        let mut server = assemble(cfg, Arc::new(MockAppSignalApi::new()));

        server
            .handle_request(request(
                1,
                "tools/call",
                json!({"name": "select_app_id", "arguments": {"app_id": "a2"}}),
            ))
            .await;

        let resp = server
            .handle_request(request(2, "resources/read", json!({"uri": CONFIG_URI})))
            .await;
        let result = resp.result.unwrap();
        let text = result["contents"][0]["text"].as_str().unwrap();
        let described: Value = serde_json::from_str(text).unwrap();

        assert_eq!(described["selected_app_id"], "a2");
        assert_eq!(described["api_key"], "***configured***");
        assert!(!text.contains("secret"));
    }
}

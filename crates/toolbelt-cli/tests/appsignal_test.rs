//! End-to-end tests of the AppSignal adapter against a mocked API.

mod common;

use common::{env, handshake, is_tool_error, request, response, run, tool_call, tool_text};
use httpmock::prelude::*;
use serde_json::{json, Value};

fn incidents(range: std::ops::Range<u64>) -> Value {
    let items: Vec<Value> = range
        .map(|n| json!({"number": n, "exception_name": "KeyError", "state": "open"}))
        .collect();
    json!({ "incidents": items })
}

fn server_env(api: &MockServer, extra: &[(&str, &str)]) -> std::collections::HashMap<String, String> {
    let base_url = api.base_url();
    let mut pairs = vec![
        ("APPSIGNAL_API_KEY", "test-token"),
        ("APPSIGNAL_BASE_URL", base_url.as_str()),
    ];
    pairs.extend_from_slice(extra);
    env(&pairs)
}

#[tokio::test]
async fn test_select_app_then_find_incident() {
    let api = MockServer::start();
    let page0 = api.mock(|when, then| {
        when.method(GET)
            .path("/api/a1/incidents/exceptions.json")
            .query_param("token", "test-token")
            .query_param("offset", "0");
        then.status(200).json_body(incidents(1..51));
    });
    let page1 = api.mock(|when, then| {
        when.method(GET)
            .path("/api/a1/incidents/exceptions.json")
            .query_param("offset", "50");
        then.status(200).json_body(incidents(51..70));
    });

    let mut server = toolbelt_appsignal::build_server(&server_env(&api, &[])).unwrap();

    let mut lines = handshake();
    lines.push(tool_call(1, "get_exception_incident", json!({"incident_number": 60})));
    lines.push(tool_call(2, "select_app_id", json!({"app_id": "a1"})));
    lines.push(tool_call(3, "get_exception_incident", json!({"incident_number": 60})));
    lines.push(tool_call(4, "get_exception_incident", json!({"incident_number": 500})));

    let responses = run(&mut server, &lines).await;

    // the initialized notification gets no reply
    assert_eq!(responses.len(), 5);

    let init = response(&responses, 0);
    assert_eq!(init["result"]["serverInfo"]["name"], "toolbelt-appsignal");

    let before_select = response(&responses, 1);
    assert!(is_tool_error(before_select));
    assert!(tool_text(before_select).contains("No app selected"));

    assert!(!is_tool_error(response(&responses, 2)));

    let found = response(&responses, 3);
    assert!(!is_tool_error(found));
    let incident: Value = serde_json::from_str(tool_text(found)).unwrap();
    assert_eq!(incident["number"], 60);

    let missing = response(&responses, 4);
    assert!(is_tool_error(missing));
    assert_eq!(
        tool_text(missing),
        "Exception incident '500' not found after scanning 2 page(s)"
    );

    page0.assert_hits(2);
    page1.assert_hits(2);
}

#[tokio::test]
async fn test_preselected_app_and_listing_hint() {
    let api = MockServer::start();
    api.mock(|when, then| {
        when.method(GET)
            .path("/api/a7/incidents/performance.json")
            .query_param("limit", "2")
            .query_param("offset", "0");
        then.status(200).json_body(json!({
            "incidents": [{"number": 1, "mean": 900.0}, {"number": 2, "mean": 450.5}]
        }));
    });

    let mut server =
        toolbelt_appsignal::build_server(&server_env(&api, &[("APPSIGNAL_APP_ID", "a7")])).unwrap();

    let lines = vec![tool_call(1, "get_performance_incidents", json!({"limit": 2}))];
    let responses = run(&mut server, &lines).await;

    let text = tool_text(response(&responses, 1));
    assert!(text.contains("\"mean\": 900.0"));
    assert!(text.contains("offset=2"));
}

#[tokio::test]
async fn test_api_errors_become_tool_errors() {
    let api = MockServer::start();
    api.mock(|when, then| {
        when.method(GET).path("/api/applications.json");
        then.status(401).body("{\"error\":\"bad token\"}");
    });

    let mut server = toolbelt_appsignal::build_server(&server_env(&api, &[])).unwrap();
    let lines = vec![
        tool_call(1, "get_apps", json!({})),
        request(2, "ping", json!({})),
    ];
    let responses = run(&mut server, &lines).await;

    let failed = response(&responses, 1);
    assert!(is_tool_error(failed));
    assert_eq!(
        tool_text(failed),
        "AppSignal: invalid credentials (HTTP 401). Check the configured API key."
    );

    // the server keeps serving after a failed call
    assert_eq!(response(&responses, 2)["result"], json!({}));
}

#[tokio::test]
async fn test_tool_group_filter() {
    let api = MockServer::start();
    let mut server = toolbelt_appsignal::build_server(&server_env(
        &api,
        &[("APPSIGNAL_ENABLED_TOOLGROUPS", "incidents")],
    ))
    .unwrap();

    let lines = vec![
        request(1, "tools/list", json!({})),
        tool_call(2, "get_apps", json!({})),
    ];
    let responses = run(&mut server, &lines).await;

    let tools = response(&responses, 1)["result"]["tools"].as_array().unwrap().clone();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec![
            "get_exception_incidents",
            "get_exception_incident",
            "get_performance_incidents",
            "get_performance_incident"
        ]
    );
    for tool in &tools {
        assert_eq!(tool["inputSchema"]["type"], "object");
    }

    let blocked = response(&responses, 2);
    assert!(is_tool_error(blocked));
    assert_eq!(tool_text(blocked), "Unknown tool: get_apps");
}

#[tokio::test]
async fn test_unknown_group_fails_startup() {
    let api = MockServer::start();
    let result = toolbelt_appsignal::build_server(&server_env(
        &api,
        &[("APPSIGNAL_ENABLED_TOOLGROUPS", "uptime")],
    ));
    assert!(result.is_err());
}

#[tokio::test]
async fn test_protocol_errors() {
    let api = MockServer::start();
    let mut server = toolbelt_appsignal::build_server(&server_env(&api, &[])).unwrap();

    let mut lines = handshake();
    lines.push("{ this is not json".to_string());
    lines.push(request(1, "initialize", json!({})));
    lines.push(request(2, "prompts/list", json!({})));
    lines.push(request(3, "resources/read", json!({"uri": "appsignal://nope"})));
    lines.push(request(4, "tools/call", json!({"arguments": {}})));

    let responses = run(&mut server, &lines).await;

    let parse_error = responses
        .iter()
        .find(|r| r["id"].is_null())
        .expect("parse error response");
    assert_eq!(parse_error["error"]["code"], -32700);

    assert_eq!(response(&responses, 1)["error"]["code"], -32600);
    assert_eq!(response(&responses, 2)["error"]["code"], -32601);
    assert_eq!(response(&responses, 3)["error"]["code"], -32602);
    assert_eq!(response(&responses, 4)["error"]["code"], -32602);
}

#[tokio::test]
async fn test_config_resource() {
    let api = MockServer::start();
    let mut server =
        toolbelt_appsignal::build_server(&server_env(&api, &[("APPSIGNAL_APP_ID", "a3")])).unwrap();

    let lines = vec![
        request(1, "resources/list", json!({})),
        request(2, "resources/read", json!({"uri": "appsignal://config"})),
    ];
    let responses = run(&mut server, &lines).await;

    let list = &response(&responses, 1)["result"]["resources"];
    assert_eq!(list[0]["uri"], "appsignal://config");
    assert_eq!(list[0]["mimeType"], "application/json");

    let contents = &response(&responses, 2)["result"]["contents"][0];
    let text = contents["text"].as_str().unwrap();
    let config: Value = serde_json::from_str(text).unwrap();
    assert_eq!(config["api_key"], "***configured***");
    assert_eq!(config["selected_app_id"], "a3");
    assert_eq!(config["base_url"], api.base_url());
    assert!(!text.contains("test-token"));
}

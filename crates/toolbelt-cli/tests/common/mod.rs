//! Helpers for driving adapter servers end to end.
//!
//! Servers are built from a plain environment map and served over an
//! in-memory transport: requests are written as JSON lines, responses are
//! read back from the output buffer.

#![allow(dead_code)]

use std::collections::HashMap;

use serde_json::{json, Value};
use toolbelt_mcp::{McpServer, StdioTransport};

/// Build an environment map.
pub fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A JSON-RPC request line.
pub fn request(id: i64, method: &str, params: Value) -> String {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string()
}

/// A JSON-RPC notification line.
pub fn notification(method: &str) -> String {
    json!({"jsonrpc": "2.0", "method": method}).to_string()
}

/// A `tools/call` request line.
pub fn tool_call(id: i64, name: &str, arguments: Value) -> String {
    request(id, "tools/call", json!({"name": name, "arguments": arguments}))
}

/// Initialize handshake lines.
pub fn handshake() -> Vec<String> {
    vec![
        request(
            0,
            "initialize",
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "integration-test", "version": "0.0.0"}
            }),
        ),
        notification("notifications/initialized"),
    ]
}

/// Serve `lines` until EOF and return every response, in order.
pub async fn run(server: &mut McpServer, lines: &[String]) -> Vec<Value> {
    let input = lines.join("\n") + "\n";
    let mut transport = StdioTransport::new(input.as_bytes(), Vec::new());
    server.serve(&mut transport).await.unwrap();

    let output = String::from_utf8(transport.into_writer()).unwrap();
    output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// Find the response with a given id.
pub fn response(responses: &[Value], id: i64) -> &Value {
    responses
        .iter()
        .find(|r| r["id"] == id)
        .unwrap_or_else(|| panic!("no response with id {}", id))
}

/// Text of a `tools/call` result.
pub fn tool_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

/// Whether a `tools/call` result is flagged as an error.
pub fn is_tool_error(response: &Value) -> bool {
    response["result"]["isError"] == true
}

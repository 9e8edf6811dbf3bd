//! MCP client for the bridge's JSON-RPC endpoint.
//!
//! Each request builds its own HTTP client, mirroring the bridge's
//! one-session-per-call behaviour. Responses from servers that do not send
//! `structuredContent` are still understood through their text content.

use super::ToolProvider;
use crate::bridge::{ToolDefinition, ToolError, ToolResult};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub struct McpClient {
    endpoint: Url,
    timeout: Duration,
    next_id: AtomicU64,
}

impl McpClient {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            endpoint: endpoint.parse()?,
            timeout,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, ToolError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, params);

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ToolError::backend_unavailable(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!(endpoint = %self.endpoint, method, id, "MCP request");
        let response = client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ToolError::backend_unavailable(format!(
                        "Bridge did not respond within {} ms",
                        self.timeout.as_millis()
                    ))
                } else {
                    ToolError::backend_unavailable(format!("Bridge unreachable: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::backend_error(format!("Bridge returned {}", status)));
        }

        let rpc: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| ToolError::backend_error(format!("Malformed JSON-RPC response: {}", e)))?;

        if let Some(error) = rpc.error {
            return Err(if error.code == INVALID_PARAMS {
                ToolError::invalid_arguments(error.message)
            } else {
                ToolError::backend_error(format!("JSON-RPC error {}: {}", error.code, error.message))
            });
        }

        rpc.result
            .ok_or_else(|| ToolError::backend_error("JSON-RPC response carried no result"))
    }
}

#[async_trait]
impl ToolProvider for McpClient {
    async fn list_tools(&self) -> Result<Vec<ToolDefinition>, ToolError> {
        let result = self.request("tools/list", None).await?;
        parse_tool_list(&result)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult {
        let params = json!({ "name": name, "arguments": arguments });
        match self.request("tools/call", Some(params)).await {
            Ok(result) => parse_call_result(result),
            Err(e) => ToolResult::failure(e),
        }
    }
}

/// Read `tools` from a tools/list result. Malformed entries are logged and
/// skipped; it is an error only if nothing usable remains.
pub fn parse_tool_list(result: &Value) -> Result<Vec<ToolDefinition>, ToolError> {
    let entries = result
        .get("tools")
        .and_then(Value::as_array)
        .ok_or_else(|| ToolError::backend_error("Expected 'tools' array in tools/list result"))?;

    let mut tools = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<ToolDefinition>(entry.clone()) {
            Ok(tool) => tools.push(tool),
            Err(e) => {
                tracing::warn!(index = idx, error = %e, "Skipping malformed tool definition");
            }
        }
    }

    if tools.is_empty() && !entries.is_empty() {
        return Err(ToolError::backend_error(
            "All tool definitions failed to parse",
        ));
    }

    Ok(tools)
}

/// Decode a tools/call result, preferring `structuredContent`.
pub fn parse_call_result(result: Value) -> ToolResult {
    if let Some(structured) = result.get("structuredContent") {
        if let Ok(parsed) = serde_json::from_value::<ToolResult>(structured.clone()) {
            return parsed;
        }
    }

    let text = result
        .get("content")
        .and_then(Value::as_array)
        .and_then(|blocks| blocks.iter().find_map(|b| b.get("text").and_then(Value::as_str)))
        .unwrap_or_default();
    let is_error = result
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if is_error {
        ToolResult::failure(ToolError::backend_error(text))
    } else {
        let payload = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));
        ToolResult::success(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::ToolErrorKind;

    #[test]
    fn test_parse_tool_list_skips_malformed() {
        let result = json!({
            "tools": [
                {"name": "get_member", "description": "d", "inputSchema": {"type": "object"}},
                {"description": "no name"},
                {"name": "ping"}
            ]
        });

        let tools = parse_tool_list(&result).unwrap();
        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["get_member", "ping"]);
    }

    #[test]
    fn test_parse_tool_list_requires_array() {
        let err = parse_tool_list(&json!({"items": []})).unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::BackendError);

        let err = parse_tool_list(&json!({"tools": [{"bogus": 1}]})).unwrap_err();
        assert!(err.message.contains("All tool definitions"));
    }

    #[test]
    fn test_parse_structured_call_result() {
        let result = parse_call_result(json!({
            "content": [{"type": "text", "text": "NotFound: gone"}],
            "isError": true,
            "structuredContent": {
                "success": false,
                "payload": null,
                "error": {"kind": "NotFound", "message": "gone"}
            }
        }));
        assert_eq!(result.error_kind(), Some(ToolErrorKind::NotFound));
    }

    #[test]
    fn test_parse_text_only_call_result() {
        let ok = parse_call_result(json!({
            "content": [{"type": "text", "text": "[{\"id\": \"MBR-001\"}]"}]
        }));
        assert!(ok.success);
        assert_eq!(ok.payload[0]["id"], "MBR-001");

        let plain = parse_call_result(json!({
            "content": [{"type": "text", "text": "MCP received: hi"}]
        }));
        assert_eq!(plain.payload, json!("MCP received: hi"));

        let failed = parse_call_result(json!({
            "content": [{"type": "text", "text": "boom"}],
            "isError": true
        }));
        assert_eq!(failed.error_kind(), Some(ToolErrorKind::BackendError));
    }
}

//! MCP HTTP endpoint for the tool bridge.
//!
//! Accepts JSON-RPC 2.0 requests at `POST /mcp`. Tool-level failures are
//! reported inside a successful `tools/call` result (`isError: true`), so a
//! JSON-RPC error always means the request itself was malformed.

use super::protocol::{
    CallToolResult, JsonRpcRequest, JsonRpcResponse, ToolCallParams, ToolsListResult,
    INTERNAL_ERROR, INVALID_REQUEST, JSONRPC_VERSION, MCP_PROTOCOL_VERSION, PARSE_ERROR,
};
use crate::bridge::ToolBridge;
use crate::handlers::health_handler;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub const SERVER_NAME: &str = "care-navigator-bridge";

/// Bridge routes, without the metrics endpoint or middleware.
pub fn mcp_router(bridge: Arc<ToolBridge>) -> Router {
    Router::new()
        .route("/mcp", post(mcp_handler))
        .route("/health", get(health_handler))
        .with_state(bridge)
}

/// POST /mcp - JSON-RPC dispatch
pub async fn mcp_handler(
    State(bridge): State<Arc<ToolBridge>>,
    payload: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection),
    };

    if req.is_notification() {
        tracing::debug!(method = %req.method, "MCP notification");
        return StatusCode::ACCEPTED.into_response();
    }

    let id = req.id.clone().unwrap_or(Value::Null);

    if req.jsonrpc != JSONRPC_VERSION {
        return Json(JsonRpcResponse::error(
            id,
            INVALID_REQUEST,
            "Invalid JSON-RPC version",
        ))
        .into_response();
    }

    let response = match req.method.as_str() {
        "initialize" => JsonRpcResponse::success(id, initialize_result()),

        "ping" => JsonRpcResponse::success(id, json!({})),

        "tools/list" => {
            let result = ToolsListResult {
                tools: bridge.definitions(),
            };
            to_response(id, &result)
        }

        "tools/call" => handle_tool_call(&bridge, id, req.params).await,

        _ => {
            tracing::warn!(method = %req.method, "Unknown MCP method");
            JsonRpcResponse::method_not_found(id, &req.method)
        }
    };

    Json(response).into_response()
}

/// Body that is not JSON is a parse error; JSON that is not a request
/// object is an invalid request. The id is unknown in both cases.
fn rejection_response(rejection: JsonRejection) -> Response {
    let code = match &rejection {
        JsonRejection::JsonDataError(_) => INVALID_REQUEST,
        _ => PARSE_ERROR,
    };
    tracing::warn!(code, error = %rejection.body_text(), "Rejected MCP request body");

    Json(JsonRpcResponse::error(Value::Null, code, rejection.body_text())).into_response()
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": MCP_PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false }
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

async fn handle_tool_call(bridge: &ToolBridge, id: Value, params: Option<Value>) -> JsonRpcResponse {
    let params: ToolCallParams = match params.map(serde_json::from_value) {
        Some(Ok(params)) => params,
        Some(Err(e)) => {
            return JsonRpcResponse::invalid_params(id, format!("Invalid params: {}", e));
        }
        None => {
            return JsonRpcResponse::invalid_params(id, "Missing params");
        }
    };

    tracing::info!(tool = %params.name, "MCP tool call");

    let result = bridge.call_tool(&params.name, params.arguments).await;
    to_response(id, &CallToolResult::from(result))
}

fn to_response<T: serde::Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Failed to encode result: {}", e)),
    }
}

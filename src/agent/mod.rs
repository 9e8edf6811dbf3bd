//! Agent orchestration over a tool provider.
//!
//! The orchestrator only needs tool discovery and invocation, expressed as
//! [`ToolProvider`]. The in-process [`ToolBridge`] and the HTTP
//! [`McpClient`] both implement it.

pub mod client;
pub mod orchestrator;

use crate::bridge::{ToolBridge, ToolDefinition, ToolError, ToolResult};
use async_trait::async_trait;
use serde_json::Value;

pub use client::McpClient;
pub use orchestrator::{AgentError, AgentReply, Orchestrator, Stage};

#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Advertised tools, in registration order.
    async fn list_tools(&self) -> Result<Vec<ToolDefinition>, ToolError>;

    /// Invoke a tool. Failures come back inside the result, never as a panic
    /// or transport error.
    async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult;
}

#[async_trait]
impl ToolProvider for ToolBridge {
    async fn list_tools(&self) -> Result<Vec<ToolDefinition>, ToolError> {
        Ok(self.definitions())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult {
        ToolBridge::call_tool(self, name, arguments).await
    }
}

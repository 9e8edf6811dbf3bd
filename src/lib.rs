//! Care Navigator - member data access, templated AI answers, an MCP tool
//! bridge, and an agent that ties them together.
//!
//! This library exposes the components behind the three binaries
//! (`care-navigator`, `care-bridge`, `care-agent`) so they can be exercised
//! from integration tests or embedded elsewhere.

pub mod agent;
pub mod bridge;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod intent;
pub mod lifecycle;
pub mod mcp;
pub mod persistence;
pub mod responder;
pub mod state;
pub mod store;

// Re-export key types for convenience
pub use agent::{AgentError, AgentReply, McpClient, Orchestrator, ToolProvider};
pub use bridge::{HttpDataAccess, ToolBridge, ToolError, ToolErrorKind, ToolRegistry, ToolResult};
pub use config::{BackendTimeouts, BridgeConfig, Config};
pub use domain::QueryContext;
pub use error::{AppError, Result};
pub use handlers::api_router;
pub use intent::{Intent, IntentClassifier, KeywordClassifier};
pub use mcp::mcp_router;
pub use responder::{Answer, QueryResponder};
pub use state::AppState;
pub use store::{MemoryStore, SeedData};

//! MCP (Model Context Protocol) transport for the tool bridge.
//!
//! The bridge speaks JSON-RPC 2.0 over `POST /mcp`:
//!
//! ```json
//! {
//!     "jsonrpc": "2.0",
//!     "id": 1,
//!     "method": "tools/call",
//!     "params": {
//!         "name": "get_member",
//!         "arguments": { "member_id": "MBR-001" }
//!     }
//! }
//! ```
//!
//! Supported methods: `initialize`, `ping`, `tools/list`, `tools/call`.
//! Notifications are acknowledged with `202 Accepted`.

pub mod protocol;
pub mod server;

pub use protocol::{CallToolResult, JsonRpcRequest, JsonRpcResponse, ToolsListResult};
pub use server::{mcp_handler, mcp_router};

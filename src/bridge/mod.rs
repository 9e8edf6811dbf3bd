//! Tool registry and bridge.
//!
//! An agent discovers the fixed tool catalog through [`ToolRegistry`] and
//! invokes tools through [`ToolBridge::call_tool`], which validates the
//! arguments, forwards to a [`DataAccess`] backend and folds every outcome
//! into a [`ToolResult`].

pub mod backend;
pub mod registry;
pub mod result;
pub mod service;

pub use backend::{DataAccess, HttpDataAccess};
pub use registry::{
    ParamSpec, ParamType, RegistryError, Tool, ToolArguments, ToolDefinition, ToolOperation,
    ToolRegistry,
};
pub use result::{ToolError, ToolErrorKind, ToolResult};
pub use service::ToolBridge;

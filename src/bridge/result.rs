//! Normalized tool outcomes.
//!
//! Every tool call ends in a [`ToolResult`]. Faults anywhere below the
//! bridge (bad arguments, transport errors, non-2xx responses) are folded
//! into a typed [`ToolError`] instead of escaping as a Rust error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolErrorKind {
    UnknownTool,
    InvalidArguments,
    /// Timeout or connection failure reaching the backend.
    BackendUnavailable,
    /// Non-2xx from the backend other than not-found.
    BackendError,
    NotFound,
    PersistenceFailure,
}

impl ToolErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolErrorKind::UnknownTool => "UnknownTool",
            ToolErrorKind::InvalidArguments => "InvalidArguments",
            ToolErrorKind::BackendUnavailable => "BackendUnavailable",
            ToolErrorKind::BackendError => "BackendError",
            ToolErrorKind::NotFound => "NotFound",
            ToolErrorKind::PersistenceFailure => "PersistenceFailure",
        }
    }
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::new(ToolErrorKind::UnknownTool, format!("Unknown tool: {}", name))
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    pub fn backend_unavailable(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::BackendUnavailable, message)
    }

    pub fn backend_error(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::BackendError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message)
    }

    pub fn persistence_failure(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::PersistenceFailure, message)
    }
}

/// Outcome of one tool invocation. `payload` is the backend's decoded body,
/// passed through untouched; it is `null` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolResult {
    pub fn success(payload: Value) -> Self {
        Self {
            success: true,
            payload,
            error: None,
        }
    }

    pub fn failure(error: ToolError) -> Self {
        Self {
            success: false,
            payload: Value::Null,
            error: Some(error),
        }
    }

    pub fn error_kind(&self) -> Option<ToolErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    pub fn into_result(self) -> Result<Value, ToolError> {
        if self.success {
            Ok(self.payload)
        } else {
            Err(self.error.unwrap_or_else(|| {
                ToolError::backend_error("Tool reported failure without an error")
            }))
        }
    }
}

impl From<Result<Value, ToolError>> for ToolResult {
    fn from(outcome: Result<Value, ToolError>) -> Self {
        match outcome {
            Ok(payload) => ToolResult::success(payload),
            Err(error) => ToolResult::failure(error),
        }
    }
}

use super::backend::{BackendResult, DataAccess};
use super::registry::{Tool, ToolArguments, ToolDefinition, ToolOperation, ToolRegistry};
use super::result::{ToolError, ToolResult};
use crate::domain::QueryContext;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

/// Validates tool invocations against the registry and forwards them to the
/// backend. `call_tool` never fails: every outcome is a [`ToolResult`].
#[derive(Clone)]
pub struct ToolBridge {
    registry: Arc<ToolRegistry>,
    backend: Arc<dyn DataAccess>,
}

impl ToolBridge {
    pub fn new(registry: Arc<ToolRegistry>, backend: Arc<dyn DataAccess>) -> Self {
        Self { registry, backend }
    }

    /// Tools in registration order.
    pub fn tools(&self) -> &[Tool] {
        self.registry.tools()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult {
        let Some(tool) = self.registry.get(name) else {
            tracing::warn!(tool = name, "Unknown tool requested");
            metrics::counter!("tool_calls_total", "tool" => "unknown", "outcome" => "UnknownTool")
                .increment(1);
            return ToolResult::failure(ToolError::unknown_tool(name));
        };

        let start = Instant::now();
        let outcome = match tool.validate(arguments) {
            Ok(args) => self.dispatch(tool.operation, &args).await,
            Err(e) => Err(e),
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let outcome_label = match &outcome {
            Ok(_) => {
                tracing::info!(tool = tool.name, elapsed_ms, "Tool call succeeded");
                "success"
            }
            Err(e) => {
                tracing::warn!(
                    tool = tool.name,
                    elapsed_ms,
                    kind = e.kind.as_str(),
                    error = %e.message,
                    "Tool call failed"
                );
                e.kind.as_str()
            }
        };
        metrics::counter!("tool_calls_total", "tool" => tool.name, "outcome" => outcome_label)
            .increment(1);
        metrics::histogram!("tool_call_latency_ms", "tool" => tool.name).record(elapsed_ms as f64);

        ToolResult::from(outcome)
    }

    async fn dispatch(&self, operation: ToolOperation, args: &ToolArguments) -> BackendResult {
        match operation {
            ToolOperation::SearchMembers => {
                self.backend
                    .search_members(args.str("memberId"), args.str("name"))
                    .await
            }
            ToolOperation::GetMember => self.backend.get_member(required(args, "member_id")?).await,
            ToolOperation::GetMemberCareGaps => {
                self.backend
                    .member_care_gaps(required(args, "member_id")?)
                    .await
            }
            ToolOperation::GetMemberAuthorizations => {
                self.backend
                    .member_authorizations(required(args, "member_id")?)
                    .await
            }
            ToolOperation::QueryAi => {
                let context = QueryContext::new(
                    args.str("memberId").map(str::to_string),
                    args.str("authorizationId").map(str::to_string),
                );
                self.backend
                    .query_ai(required(args, "query")?, &context)
                    .await
            }
            ToolOperation::Ping => {
                let message = args.str("message").unwrap_or_default();
                Ok(json!(format!("MCP received: {}", message)))
            }
        }
    }
}

/// Validated arguments always carry required parameters; a miss here means
/// the tool's declared schema and its operation disagree.
fn required<'a>(args: &'a ToolArguments, key: &str) -> Result<&'a str, ToolError> {
    args.str(key).ok_or_else(|| {
        ToolError::invalid_arguments(format!("Missing required argument `{}`", key))
    })
}

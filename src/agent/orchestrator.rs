//! Discover → Ground → Query → Respond.
//!
//! The orchestrator walks a fixed sequence of stages against a
//! [`ToolProvider`]. Grounding is skipped when no member is in context.
//! Any tool failure ends the run with an [`AgentError`] whose variant tells
//! "the data does not exist" apart from "the system could not be reached".

use super::ToolProvider;
use crate::bridge::{ToolError, ToolErrorKind};
use crate::domain::QueryContext;
use serde_json::{json, Value};
use thiserror::Error;

const GET_MEMBER: &str = "get_member";
const QUERY_AI: &str = "query_ai";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("No answer found: {message}")]
    NoAnswer { tool: String, message: String },

    #[error("System unavailable: {message}")]
    Unavailable { tool: String, message: String },

    #[error("Tool {tool} failed ({kind}): {message}")]
    ToolFailed {
        tool: String,
        kind: ToolErrorKind,
        message: String,
    },

    #[error("Tool {0} is not offered by the bridge")]
    MissingTool(String),

    #[error("Unexpected response from {tool}: {message}")]
    MalformedResponse { tool: String, message: String },
}

impl AgentError {
    pub fn from_tool_error(tool: &str, error: ToolError) -> Self {
        let tool = tool.to_string();
        match error.kind {
            ToolErrorKind::NotFound => Self::NoAnswer {
                tool,
                message: error.message,
            },
            ToolErrorKind::BackendUnavailable => Self::Unavailable {
                tool,
                message: error.message,
            },
            kind => Self::ToolFailed {
                tool,
                kind,
                message: error.message,
            },
        }
    }

    /// The underlying tool error kind, if the failure came from a tool.
    pub fn tool_error_kind(&self) -> Option<ToolErrorKind> {
        match self {
            Self::NoAnswer { .. } => Some(ToolErrorKind::NotFound),
            Self::Unavailable { .. } => Some(ToolErrorKind::BackendUnavailable),
            Self::ToolFailed { kind, .. } => Some(*kind),
            Self::MissingTool(_) | Self::MalformedResponse { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discover,
    Ground,
    Query,
    Respond,
}

/// Facts gathered while walking the stages.
#[derive(Debug, Default)]
struct Session {
    tools: Vec<String>,
    member: Option<Value>,
    answer: Option<Value>,
}

impl Session {
    fn offers(&self, tool: &str) -> bool {
        self.tools.iter().any(|t| t == tool)
    }
}

/// Outcome of a run: the tools discovered on the way and the composed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub tools: Vec<String>,
    pub text: String,
}

pub struct Orchestrator<P> {
    provider: P,
}

impl<P: ToolProvider> Orchestrator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Answer `user_query` for the given context, returning the composed text.
    pub async fn run(&self, user_query: &str, context: QueryContext) -> Result<String, AgentError> {
        self.respond(user_query, context).await.map(|reply| reply.text)
    }

    /// Like [`Orchestrator::run`], but also hands back the discovered tool names.
    pub async fn respond(&self, user_query: &str, context: QueryContext) -> Result<AgentReply, AgentError> {
        let context = context.normalized();
        let mut session = Session::default();
        let mut stage = Stage::Discover;

        loop {
            tracing::debug!(?stage, "Agent stage");
            stage = match stage {
                Stage::Discover => self.discover(&context, &mut session).await?,
                Stage::Ground => self.ground(&context, &mut session).await?,
                Stage::Query => self.query(user_query, &context, &mut session).await?,
                Stage::Respond => {
                    let text = compose(&session)?;
                    return Ok(AgentReply {
                        tools: session.tools,
                        text,
                    });
                }
            };
        }
    }

    async fn discover(&self, context: &QueryContext, session: &mut Session) -> Result<Stage, AgentError> {
        let tools = self
            .provider
            .list_tools()
            .await
            .map_err(|e| AgentError::from_tool_error("tools/list", e))?;

        session.tools = tools.into_iter().map(|t| t.name).collect();
        tracing::info!(tools = ?session.tools, "Discovered tools");

        let grounded = context.member_id.is_some();
        let needed: &[&str] = if grounded { &[GET_MEMBER, QUERY_AI] } else { &[QUERY_AI] };
        if let Some(missing) = needed.iter().find(|t| !session.offers(t)) {
            return Err(AgentError::MissingTool(missing.to_string()));
        }

        Ok(if grounded { Stage::Ground } else { Stage::Query })
    }

    async fn ground(&self, context: &QueryContext, session: &mut Session) -> Result<Stage, AgentError> {
        let Some(member_id) = context.member_id.as_deref() else {
            return Ok(Stage::Query);
        };

        let member = self.call(GET_MEMBER, json!({ "member_id": member_id })).await?;
        session.member = Some(member);
        Ok(Stage::Query)
    }

    async fn query(
        &self,
        user_query: &str,
        context: &QueryContext,
        session: &mut Session,
    ) -> Result<Stage, AgentError> {
        let mut arguments = json!({ "query": user_query });
        if let Some(member_id) = &context.member_id {
            arguments["memberId"] = json!(member_id);
        }
        if let Some(authorization_id) = &context.authorization_id {
            arguments["authorizationId"] = json!(authorization_id);
        }

        let answer = self.call(QUERY_AI, arguments).await?;
        session.answer = Some(answer);
        Ok(Stage::Respond)
    }

    async fn call(&self, tool: &str, arguments: Value) -> Result<Value, AgentError> {
        self.provider
            .call_tool(tool, arguments)
            .await
            .into_result()
            .map_err(|e| AgentError::from_tool_error(tool, e))
    }
}

fn compose(session: &Session) -> Result<String, AgentError> {
    let answer = session.answer.as_ref().ok_or_else(|| AgentError::MalformedResponse {
        tool: QUERY_AI.to_string(),
        message: "no answer was produced".to_string(),
    })?;

    let response = answer
        .get("response")
        .and_then(Value::as_str)
        .ok_or_else(|| AgentError::MalformedResponse {
            tool: QUERY_AI.to_string(),
            message: "missing 'response' text".to_string(),
        })?;

    let mut lines = Vec::new();

    if let Some(member) = &session.member {
        let name = [member.get("firstName"), member.get("lastName")]
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        let id = member.get("id").and_then(Value::as_str).unwrap_or("unknown");
        lines.push(format!("Member: {} ({})", name, id));
    }

    lines.push(response.to_string());

    let sources: Vec<&str> = answer
        .get("sources")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if !sources.is_empty() {
        lines.push(format!("Sources: {}", sources.join(", ")));
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{ToolDefinition, ToolResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted provider: fixed tool list, canned result per tool name.
    struct Scripted {
        tools: Vec<&'static str>,
        results: Vec<(&'static str, ToolResult)>,
        calls: Mutex<Vec<(String, Value)>>,
        listings: Mutex<usize>,
    }

    impl Scripted {
        fn new(tools: Vec<&'static str>, results: Vec<(&'static str, ToolResult)>) -> Self {
            Self {
                tools,
                results,
                calls: Mutex::new(Vec::new()),
                listings: Mutex::new(0),
            }
        }

        fn called(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
        }
    }

    #[async_trait]
    impl ToolProvider for Scripted {
        async fn list_tools(&self) -> Result<Vec<ToolDefinition>, ToolError> {
            *self.listings.lock().unwrap() += 1;
            Ok(self
                .tools
                .iter()
                .map(|name| ToolDefinition {
                    name: name.to_string(),
                    description: String::new(),
                    input_schema: json!({"type": "object"}),
                })
                .collect())
        }

        async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult {
            self.calls.lock().unwrap().push((name.to_string(), arguments));
            self.results
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, r)| r.clone())
                .unwrap_or_else(|| ToolResult::failure(ToolError::unknown_tool(name)))
        }
    }

    fn answer() -> ToolResult {
        ToolResult::success(json!({
            "response": "The authorization was denied.",
            "sources": ["Authorization Policy", "Clinical Guidelines"]
        }))
    }

    fn member() -> ToolResult {
        ToolResult::success(json!({"id": "MBR-001", "firstName": "John", "lastName": "Smith"}))
    }

    #[tokio::test]
    async fn test_grounded_run_composes_member_and_sources() {
        let provider = Scripted::new(
            vec!["get_member", "query_ai"],
            vec![("get_member", member()), ("query_ai", answer())],
        );
        let orchestrator = Orchestrator::new(provider);

        let text = orchestrator
            .run(
                "Why was this denied?",
                QueryContext::new(Some("MBR-001".into()), Some("AUTH-002".into())),
            )
            .await
            .unwrap();

        assert_eq!(
            text,
            "Member: John Smith (MBR-001)\nThe authorization was denied.\nSources: Authorization Policy, Clinical Guidelines"
        );
        assert_eq!(orchestrator.provider().called(), vec!["get_member", "query_ai"]);

        let calls = orchestrator.provider().calls.lock().unwrap();
        assert_eq!(calls[1].1["memberId"], "MBR-001");
        assert_eq!(calls[1].1["authorizationId"], "AUTH-002");
    }

    #[tokio::test]
    async fn test_reply_carries_discovered_tools() {
        let provider = Scripted::new(vec!["ping", "query_ai"], vec![("query_ai", answer())]);
        let orchestrator = Orchestrator::new(provider);

        let reply = orchestrator
            .respond("What are the care gaps?", QueryContext::default())
            .await
            .unwrap();

        assert_eq!(reply.tools, vec!["ping", "query_ai"]);
        assert!(reply.text.starts_with("The authorization was denied."));
        assert_eq!(*orchestrator.provider().listings.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_member_skips_grounding() {
        let provider = Scripted::new(vec!["get_member", "query_ai"], vec![("query_ai", answer())]);
        let orchestrator = Orchestrator::new(provider);

        let text = orchestrator
            .run("What are the care gaps?", QueryContext::default())
            .await
            .unwrap();

        assert!(text.starts_with("The authorization was denied."));
        assert_eq!(orchestrator.provider().called(), vec!["query_ai"]);
    }

    #[tokio::test]
    async fn test_not_found_and_unavailable_are_distinct() {
        let missing = Scripted::new(
            vec!["get_member", "query_ai"],
            vec![("get_member", ToolResult::failure(ToolError::not_found("Member not found: MBR-999")))],
        );
        let err = Orchestrator::new(missing)
            .run("q", QueryContext::new(Some("MBR-999".into()), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::NoAnswer { .. }));
        assert!(err.to_string().starts_with("No answer found"));

        let down = Scripted::new(
            vec!["get_member", "query_ai"],
            vec![("get_member", ToolResult::failure(ToolError::backend_unavailable("connection refused")))],
        );
        let err = Orchestrator::new(down)
            .run("q", QueryContext::new(Some("MBR-001".into()), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Unavailable { .. }));
        assert!(err.to_string().starts_with("System unavailable"));
    }

    #[tokio::test]
    async fn test_missing_tool_is_reported() {
        let provider = Scripted::new(vec!["ping"], vec![]);
        let err = Orchestrator::new(provider)
            .run("q", QueryContext::default())
            .await
            .unwrap_err();
        assert_eq!(err, AgentError::MissingTool("query_ai".to_string()));
        assert_eq!(err.tool_error_kind(), None);
    }

    #[tokio::test]
    async fn test_answer_without_response_is_malformed() {
        let provider = Scripted::new(
            vec!["query_ai"],
            vec![("query_ai", ToolResult::success(json!({"sources": []})))],
        );
        let err = Orchestrator::new(provider)
            .run("q", QueryContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::MalformedResponse { .. }));
    }
}

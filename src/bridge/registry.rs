//! Tool catalog.
//!
//! The registry is built once at startup and never mutated; it is shared by
//! reference between the bridge and the MCP server. Tests build their own.

use super::result::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
}

impl ParamType {
    /// JSON Schema type name.
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
        }
    }

    /// Converts `value` to this type where the conversion is lossless,
    /// e.g. `42` to `"42"` or `"true"` to `true`.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (ParamType::String, Value::String(_)) => Some(value.clone()),
            (ParamType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (ParamType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),

            (ParamType::Integer, Value::Number(n)) => n.as_i64().map(Value::from),
            (ParamType::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),

            (ParamType::Boolean, Value::Bool(_)) => Some(value.clone()),
            (ParamType::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },

            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamType,
    pub required: bool,
    pub default: Option<Value>,
    pub description: &'static str,
    /// Reject `""` and whitespace-only strings. Set for identifiers that
    /// become URL path segments.
    pub non_blank: bool,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
            description,
            non_blank: false,
        }
    }

    pub fn optional(name: &'static str, kind: ParamType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            description,
            non_blank: false,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn non_blank(mut self) -> Self {
        self.non_blank = true;
        self
    }
}

/// The downstream operation a tool forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOperation {
    SearchMembers,
    GetMember,
    GetMemberCareGaps,
    GetMemberAuthorizations,
    QueryAi,
    /// Answered by the bridge itself; never touches the backend.
    Ping,
}

#[derive(Debug, Clone)]
pub struct Tool {
    pub name: &'static str,
    pub description: &'static str,
    /// Declaration order is the order advertised in the input schema.
    pub params: Vec<ParamSpec>,
    pub operation: ToolOperation,
}

/// MCP tool definition as advertised by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

/// Arguments that passed validation: every value has its declared type and
/// absent optionals carry their defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Tool {
    /// Check `arguments` against the declared parameters.
    pub fn validate(&self, arguments: Value) -> Result<ToolArguments, ToolError> {
        let supplied = match arguments {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(ToolError::invalid_arguments(format!(
                    "Arguments for `{}` must be an object, got {}",
                    self.name,
                    json_kind(&other)
                )))
            }
        };

        let mut validated = Map::new();
        for spec in &self.params {
            match supplied.get(spec.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    let coerced = spec.kind.coerce(value).ok_or_else(|| {
                        ToolError::invalid_arguments(format!(
                            "Argument `{}` of `{}` must be {}, got {}",
                            spec.name,
                            self.name,
                            spec.kind.json_type(),
                            json_kind(value)
                        ))
                    })?;
                    if spec.non_blank && coerced.as_str().is_some_and(|s| s.trim().is_empty()) {
                        return Err(ToolError::invalid_arguments(format!(
                            "Argument `{}` of `{}` must not be blank",
                            spec.name, self.name
                        )));
                    }
                    validated.insert(spec.name.to_string(), coerced);
                }
                None if spec.required => {
                    return Err(ToolError::invalid_arguments(format!(
                        "Missing required argument `{}` for `{}`",
                        spec.name, self.name
                    )));
                }
                None => {
                    if let Some(default) = &spec.default {
                        validated.insert(spec.name.to_string(), default.clone());
                    }
                }
            }
        }

        for key in supplied.keys() {
            if !self.params.iter().any(|p| p.name == key.as_str()) {
                tracing::debug!(tool = self.name, argument = %key, "Dropping undeclared argument");
            }
        }

        Ok(ToolArguments(validated))
    }

    /// JSON Schema object for the parameter list.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for spec in &self.params {
            let mut property = json!({
                "type": spec.kind.json_type(),
                "description": spec.description,
            });
            if let Some(default) = &spec.default {
                property["default"] = default.clone();
            }
            properties.insert(spec.name.to_string(), property);
        }

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),
}

/// Immutable, ordered tool catalog.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Tool>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::with_capacity(tools.len());
        for tool in &tools {
            if !seen.insert(tool.name) {
                return Err(RegistryError::DuplicateTool(tool.name.to_string()));
            }
        }
        Ok(Self { tools })
    }

    /// The six care-navigation tools.
    pub fn care_navigator() -> Self {
        use ParamType::String as Str;

        let member_id =
            || ParamSpec::required("member_id", Str, "Member identifier, e.g. MBR-001").non_blank();

        Self {
            tools: vec![
                Tool {
                    name: "search_members",
                    description: "Search members by memberId (partial ok) and/or name (partial ok).",
                    params: vec![
                        ParamSpec::optional("memberId", Str, "Partial member identifier"),
                        ParamSpec::optional("name", Str, "Partial first, last or full name"),
                    ],
                    operation: ToolOperation::SearchMembers,
                },
                Tool {
                    name: "get_member",
                    description: "Get a single member profile.",
                    params: vec![member_id()],
                    operation: ToolOperation::GetMember,
                },
                Tool {
                    name: "get_member_care_gaps",
                    description: "Get care gaps for a member.",
                    params: vec![member_id()],
                    operation: ToolOperation::GetMemberCareGaps,
                },
                Tool {
                    name: "get_member_authorizations",
                    description: "Get authorizations for a member.",
                    params: vec![member_id()],
                    operation: ToolOperation::GetMemberAuthorizations,
                },
                Tool {
                    name: "query_ai",
                    description: "Ask the AI care navigator a question. The interaction is recorded.",
                    params: vec![
                        ParamSpec::required("query", Str, "Free-text question"),
                        ParamSpec::optional("memberId", Str, "Member the question is about"),
                        ParamSpec::optional("authorizationId", Str, "Authorization the question is about"),
                    ],
                    operation: ToolOperation::QueryAi,
                },
                Tool {
                    name: "ping",
                    description: "Connectivity check; echoes the message back.",
                    params: vec![ParamSpec::required("message", Str, "Text to echo")],
                    operation: ToolOperation::Ping,
                },
            ],
        }
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Tools in registration order.
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(Tool::definition).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::result::ToolErrorKind;

    fn tool(name: &str) -> Tool {
        ToolRegistry::care_navigator().get(name).cloned().unwrap()
    }

    #[test]
    fn test_catalog_order_and_names() {
        let registry = ToolRegistry::care_navigator();
        let names: Vec<_> = registry.tools().iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "search_members",
                "get_member",
                "get_member_care_gaps",
                "get_member_authorizations",
                "query_ai",
                "ping",
            ]
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let ping = tool("ping");
        let err = ToolRegistry::new(vec![ping.clone(), ping]).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTool("ping".into()));
    }

    #[test]
    fn test_missing_required_argument() {
        let err = tool("get_member").validate(json!({})).unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArguments);
        assert!(err.message.contains("member_id"));
    }

    #[test]
    fn test_blank_member_id_rejected() {
        let err = tool("get_member")
            .validate(json!({"member_id": "  "}))
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArguments);
    }

    #[test]
    fn test_blank_free_text_accepted() {
        let args = tool("query_ai").validate(json!({"query": "   "})).unwrap();
        assert_eq!(args.str("query"), Some("   "));

        let args = tool("ping").validate(json!({"message": ""})).unwrap();
        assert_eq!(args.str("message"), Some(""));
    }

    #[test]
    fn test_wrong_type_rejected_coercible_type_accepted() {
        let err = tool("query_ai")
            .validate(json!({"query": ["not", "a", "string"]}))
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArguments);

        let args = tool("ping").validate(json!({"message": 42})).unwrap();
        assert_eq!(args.str("message"), Some("42"));
    }

    #[test]
    fn test_non_object_arguments_rejected() {
        let err = tool("ping").validate(json!("hello")).unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArguments);
    }

    #[test]
    fn test_null_optional_and_undeclared_dropped() {
        let args = tool("search_members")
            .validate(json!({"memberId": null, "name": "John", "extra": true}))
            .unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args.str("name"), Some("John"));
        assert!(args.get("extra").is_none());
    }

    #[test]
    fn test_defaults_fill_absent_optionals() {
        let custom = Tool {
            name: "list",
            description: "",
            params: vec![
                ParamSpec::optional("limit", ParamType::Integer, "").with_default(json!(10)),
                ParamSpec::optional("verbose", ParamType::Boolean, ""),
            ],
            operation: ToolOperation::Ping,
        };

        let args = custom.validate(json!({"verbose": "TRUE"})).unwrap();
        assert_eq!(args.get("limit"), Some(&json!(10)));
        assert_eq!(args.get("verbose"), Some(&json!(true)));

        let args = custom.validate(json!({"limit": "25"})).unwrap();
        assert_eq!(args.get("limit"), Some(&json!(25)));

        let err = custom.validate(json!({"limit": 2.5})).unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArguments);
    }

    #[test]
    fn test_input_schema_lists_required() {
        let schema = tool("query_ai").input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["query"]));
        assert_eq!(schema["properties"]["memberId"]["type"], "string");
    }
}

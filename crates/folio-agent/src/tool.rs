//! Tool framework for agent capabilities.
//!
//! This module defines the [`Tool`] trait that all agent tools implement,
//! the [`ToolRegistry`] snapshot the agent is built from, and the typed
//! parameter structs the concrete tools validate their arguments into.
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_agent::{Tool, ToolContext, ToolResult, ToolRegistry};
//!
//! struct EchoTool;
//!
//! #[async_trait]
//! impl Tool for EchoTool {
//!     fn name(&self) -> &str { "echo" }
//!     fn description(&self) -> &str { "Echo the arguments back" }
//!     fn parameters(&self) -> Value { json!({"type": "object"}) }
//!
//!     async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<ToolResult> {
//!         Ok(ToolResult::json(params))
//!     }
//! }
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(EchoTool);
//! ```

use async_trait::async_trait;
use folio_notion::RenderMode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::schema::ToolDescriptor;

// ─────────────────────────────────────────────────────────────────────────────
// Parameter Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Error type for tool parameter validation failures.
///
/// Messages are written for the model, so it can correct the call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParameterValidationError {
    /// A required parameter is missing.
    #[error("missing required parameter '{name}': {hint}")]
    MissingRequired {
        name: &'static str,
        hint: &'static str,
    },

    /// A parameter value is out of range.
    #[error("'{name}' value {value} is out of range: {constraint}")]
    OutOfRange {
        name: &'static str,
        value: String,
        constraint: String,
    },

    /// A parameter value doesn't match the expected pattern.
    #[error("'{name}' has invalid value '{value}': {message}")]
    InvalidValue {
        name: &'static str,
        value: String,
        message: String,
    },
}

impl ParameterValidationError {
    /// Create a missing required parameter error.
    pub fn missing(name: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { name, hint }
    }

    /// Create an out of range error.
    pub fn out_of_range(
        name: &'static str,
        value: impl ToString,
        constraint: impl Into<String>,
    ) -> Self {
        Self::OutOfRange {
            name,
            value: value.to_string(),
            constraint: constraint.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(
        name: &'static str,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            name,
            value: value.into(),
            message: message.into(),
        }
    }

    /// The parameter this error is about.
    pub fn parameter_name(&self) -> &str {
        match self {
            Self::MissingRequired { name, .. }
            | Self::OutOfRange { name, .. }
            | Self::InvalidValue { name, .. } => name,
        }
    }
}

impl From<ParameterValidationError> for AgentError {
    fn from(err: ParameterValidationError) -> Self {
        AgentError::InvalidToolParams(err.to_string())
    }
}

/// Result type for parameter validation.
pub type ParamResult<T> = std::result::Result<T, ParameterValidationError>;

/// Helper trait for extracting parameters from JSON arguments.
pub trait ParamExt {
    /// Get a required, non-blank string parameter.
    fn required_str(&self, name: &'static str, hint: &'static str) -> ParamResult<&str>;

    /// Get an optional string parameter. Blank strings count as absent.
    fn optional_str(&self, name: &str) -> Option<&str>;

    /// Get an optional u64 parameter with default.
    ///
    /// Numeric strings are accepted, since models sometimes quote numbers.
    fn optional_u64(&self, name: &str, default: u64) -> u64;
}

impl ParamExt for Value {
    fn required_str(&self, name: &'static str, hint: &'static str) -> ParamResult<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ParameterValidationError::missing(name, hint))
    }

    fn optional_str(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    fn optional_u64(&self, name: &str, default: u64) -> u64 {
        match self.get(name) {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Typed Parameter Structs
// ─────────────────────────────────────────────────────────────────────────────

/// Default number of search results.
pub const DEFAULT_TOP_K: u64 = 5;

/// Default descent depth for page content.
pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// Longest paragraph text accepted by the content source, in characters.
pub const MAX_PARAGRAPH_CHARS: usize = 2000;

/// Validated parameters for search tools.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub top_k: u32,
}

impl TryFrom<&Value> for SearchParams {
    type Error = ParameterValidationError;

    fn try_from(params: &Value) -> std::result::Result<Self, Self::Error> {
        let query = params.required_str("query", "provide the text to search for")?;
        let top_k = params.optional_u64("top_k", DEFAULT_TOP_K);
        if !(1..=100).contains(&top_k) {
            return Err(ParameterValidationError::out_of_range(
                "top_k",
                top_k,
                "must be between 1 and 100",
            ));
        }

        Ok(Self {
            query: query.to_string(),
            top_k: top_k as u32,
        })
    }
}

/// Validated parameters for page content tools.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContentParams {
    pub page_id: String,
    pub mode: RenderMode,
    pub max_depth: u32,
}

impl PageContentParams {
    /// Parse with `default_depth` used when the caller gives no `max_depth`.
    pub fn parse(params: &Value, default_depth: u32) -> ParamResult<Self> {
        let page_id = params.required_str("page_id", "provide the id of the page to read")?;
        let mode = params
            .optional_str("format")
            .map(RenderMode::from_format)
            .unwrap_or_default();
        let max_depth = params.optional_u64("max_depth", u64::from(default_depth));
        if max_depth > 100 {
            return Err(ParameterValidationError::out_of_range(
                "max_depth",
                max_depth,
                "must be at most 100",
            ));
        }

        Ok(Self {
            page_id: page_id.to_string(),
            mode,
            max_depth: max_depth as u32,
        })
    }
}

impl TryFrom<&Value> for PageContentParams {
    type Error = ParameterValidationError;

    fn try_from(params: &Value) -> std::result::Result<Self, Self::Error> {
        Self::parse(params, DEFAULT_MAX_DEPTH)
    }
}

/// Validated parameters for the paragraph append tool.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendParams {
    pub page_id: String,
    /// Paragraph text, cut to [`MAX_PARAGRAPH_CHARS`] characters.
    pub text: String,
}

impl TryFrom<&Value> for AppendParams {
    type Error = ParameterValidationError;

    fn try_from(params: &Value) -> std::result::Result<Self, Self::Error> {
        let page_id = params.required_str("page_id", "provide the id of the page to append to")?;
        let text = params
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| ParameterValidationError::missing("text", "provide the paragraph text"))?;

        Ok(Self {
            page_id: page_id.to_string(),
            text: text.chars().take(MAX_PARAGRAPH_CHARS).collect(),
        })
    }
}

/// Identity parameters of user-scoped tools.
#[derive(Debug, Clone, PartialEq)]
pub struct UserParams {
    pub user_id: String,
    pub cookies: Option<String>,
}

impl TryFrom<&Value> for UserParams {
    type Error = ParameterValidationError;

    fn try_from(params: &Value) -> std::result::Result<Self, Self::Error> {
        let user_id = params.required_str("user_id", "provide the id of the current user")?;
        Ok(Self {
            user_id: user_id.to_string(),
            cookies: params.optional_str("cookies").map(String::from),
        })
    }
}

/// JSON schema properties shared by user-scoped tools.
pub fn identity_properties() -> serde_json::Map<String, Value> {
    let mut props = serde_json::Map::new();
    props.insert(
        "user_id".to_string(),
        json!({"type": "string", "description": "Id of the current user"}),
    );
    props.insert(
        "cookies".to_string(),
        json!({"type": "string", "description": "Session cookie string of the current user"}),
    );
    props
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Context
// ─────────────────────────────────────────────────────────────────────────────

/// Identity of the caller of one chat request.
///
/// Both values are opaque strings passed through to the tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    pub user_id: Option<String>,
    pub cookies: Option<String>,
}

impl CallerContext {
    /// A caller with no known identity.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A caller with a user id.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            cookies: None,
        }
    }

    /// Attach a session cookie string.
    pub fn with_cookies(mut self, cookies: impl Into<String>) -> Self {
        self.cookies = Some(cookies.into());
        self
    }

    /// The user id, if present and non-blank.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// The cookie string, if present and non-blank.
    pub fn cookies(&self) -> Option<&str> {
        self.cookies.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Context provided to tools during execution.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// Id of the tool call being answered.
    pub call_id: String,
    /// Identity of the chat request's caller.
    pub caller: CallerContext,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(call_id: impl Into<String>, caller: CallerContext) -> Self {
        Self {
            call_id: call_id.into(),
            caller,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A named operation the model can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name of the tool, unique within a registry.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema of the tool's parameters.
    fn parameters(&self) -> Value;

    /// Whether the tool acts on behalf of the caller and takes `user_id`
    /// and `cookies` arguments.
    fn requires_caller(&self) -> bool {
        false
    }

    /// Run the tool.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult>;

    /// The registry entry for this tool.
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(self.name(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Result
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResult {
    /// Successful text output.
    Text { content: String },
    /// Successful structured output.
    Json { content: Value },
    /// The call failed; the model sees this record and can react to it.
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl ToolResult {
    /// Create a text result.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Create a JSON result.
    pub fn json(content: Value) -> Self {
        Self::Json { content }
    }

    /// Create an error result.
    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
            detail: None,
        }
    }

    /// Create an error result with extra detail.
    pub fn error_with_detail(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
            detail: Some(detail.into()),
        }
    }

    /// Check if this result is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Check if this result is successful.
    pub fn is_success(&self) -> bool {
        !self.is_error()
    }

    /// The single string sent back to the model as the tool message content.
    ///
    /// Text is passed as-is; structured values and error records are encoded
    /// as compact JSON with non-ASCII characters kept literal.
    pub fn to_llm_content(&self) -> String {
        match self {
            Self::Text { content } => content.clone(),
            Self::Json { content } => content.to_string(),
            Self::Error { error, detail } => {
                let mut record = serde_json::Map::new();
                record.insert("error".to_string(), Value::String(error.clone()));
                if let Some(detail) = detail {
                    record.insert("detail".to_string(), Value::String(detail.clone()));
                }
                Value::Object(record).to_string()
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Registry
// ─────────────────────────────────────────────────────────────────────────────

/// The set of tools available to an agent.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// If a tool with the same name already exists, it will be replaced.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    /// Register a tool from an Arc.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registry snapshot as descriptors, sorted by name.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.names()
            .into_iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.descriptor())
            .collect()
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, params: Value, ctx: &ToolContext) -> Result<ToolResult> {
        let tool = self
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;
        tool.execute(params, ctx).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock Tool
// ─────────────────────────────────────────────────────────────────────────────

/// A mock tool for testing.
///
/// Returns a configurable response and records every call.
#[cfg(test)]
#[derive(Debug)]
pub struct MockTool {
    name: String,
    requires_caller: bool,
    response: std::sync::Mutex<Option<Result<ToolResult>>>,
    calls: std::sync::Mutex<Vec<(Value, CallerContext)>>,
}

#[cfg(test)]
impl MockTool {
    /// Create a new mock tool.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires_caller: false,
            response: std::sync::Mutex::new(None),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Mark the tool as acting on behalf of the caller.
    pub fn user_scoped(mut self) -> Self {
        self.requires_caller = true;
        self
    }

    /// Set the response to return.
    pub fn with_response(self, response: ToolResult) -> Self {
        *self.response.lock().unwrap() = Some(Ok(response));
        self
    }

    /// Fail every call with `error`.
    pub fn failing(self, error: AgentError) -> Self {
        *self.response.lock().unwrap() = Some(Err(error));
        self
    }

    /// Arguments of every call, in order.
    pub fn calls(&self) -> Vec<Value> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    /// Caller context of every call, in order.
    pub fn callers(&self) -> Vec<CallerContext> {
        self.calls.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "A mock tool for testing"
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    fn requires_caller(&self) -> bool {
        self.requires_caller
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult> {
        self.calls.lock().unwrap().push((params, ctx.caller.clone()));

        match &*self.response.lock().unwrap() {
            Some(Ok(result)) => Ok(result.clone()),
            Some(Err(AgentError::Config(msg))) => Err(AgentError::Config(msg.clone())),
            Some(Err(AgentError::ToolRejected { message, detail })) => {
                Err(AgentError::rejected(message.clone(), detail.clone()))
            }
            Some(Err(other)) => Err(AgentError::tool(other.to_string())),
            None => Ok(ToolResult::text("mock response")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_text() {
        let result = ToolResult::text("hello");
        assert!(result.is_success());
        assert_eq!(result.to_llm_content(), "hello");
    }

    #[test]
    fn test_tool_result_json_is_compact() {
        let result = ToolResult::json(json!([{"title": "회의록"}]));
        assert_eq!(result.to_llm_content(), r#"[{"title":"회의록"}]"#);
    }

    #[test]
    fn test_tool_result_error_record() {
        let result = ToolResult::error("not found");
        assert!(result.is_error());
        assert_eq!(result.to_llm_content(), r#"{"error":"not found"}"#);

        let result = ToolResult::error_with_detail("failed", "status 502");
        let parsed: Value = serde_json::from_str(&result.to_llm_content()).unwrap();
        assert_eq!(parsed, json!({"error": "failed", "detail": "status 502"}));
    }

    #[test]
    fn test_tool_result_text_is_verbatim() {
        let result = ToolResult::text(r"literal \uD800 text");
        assert_eq!(result.to_llm_content(), r"literal \uD800 text");
    }

    #[test]
    fn test_tool_result_serialization() {
        let result = ToolResult::text("test");
        let json = serde_json::to_string(&result).unwrap();
        let restored: ToolResult = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, result);
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(MockTool::new("b_tool"));
        registry.register(MockTool::new("a_tool"));
        registry.register(MockTool::new("a_tool"));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("a_tool"));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.names(), vec!["a_tool", "b_tool"]);
    }

    #[test]
    fn test_registry_descriptors() {
        let mut registry = ToolRegistry::new();
        registry.register(MockTool::new("search"));

        let descriptors = registry.descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, "search");
        assert_eq!(descriptors[0].input_schema["type"], "object");
    }

    #[tokio::test]
    async fn test_registry_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(MockTool::new("echo").with_response(ToolResult::text("pong")));

        let ctx = ToolContext::default();
        let result = registry.execute("echo", json!({}), &ctx).await.unwrap();
        assert_eq!(result, ToolResult::text("pong"));

        let err = registry.execute("nope", json!({}), &ctx).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(_)));
    }

    #[test]
    fn test_param_ext() {
        let params = json!({"query": "x", "blank": "  ", "n": "7", "m": 3});
        assert_eq!(params.required_str("query", "hint").unwrap(), "x");
        assert!(params.required_str("blank", "hint").is_err());
        assert_eq!(params.optional_str("blank"), None);
        assert_eq!(params.optional_u64("n", 1), 7);
        assert_eq!(params.optional_u64("m", 1), 3);
        assert_eq!(params.optional_u64("missing", 1), 1);
    }

    #[test]
    fn test_param_validation_error_into_agent_error() {
        let err: AgentError = ParameterValidationError::missing("query", "provide it").into();
        assert!(matches!(err, AgentError::InvalidToolParams(_)));
        assert!(err.to_string().contains("query"));
    }

    #[test]
    fn test_search_params() {
        let params = SearchParams::try_from(&json!({"query": "notes"})).unwrap();
        assert_eq!(params.top_k, 5);

        let err = SearchParams::try_from(&json!({"query": "notes", "top_k": 0})).unwrap_err();
        assert_eq!(err.parameter_name(), "top_k");
        assert!(SearchParams::try_from(&json!({})).is_err());
    }

    #[test]
    fn test_page_content_params() {
        let params = PageContentParams::try_from(&json!({"page_id": "p1"})).unwrap();
        assert_eq!(params.mode, RenderMode::Structured);
        assert_eq!(params.max_depth, 10);

        let params =
            PageContentParams::try_from(&json!({"page_id": "p1", "format": "Plain", "max_depth": 0}))
                .unwrap();
        assert_eq!(params.mode, RenderMode::Reduced);
        assert_eq!(params.max_depth, 0);
    }

    #[test]
    fn test_append_params_truncates_text() {
        let long = "가".repeat(MAX_PARAGRAPH_CHARS + 10);
        let params = AppendParams::try_from(&json!({"page_id": "p1", "text": long})).unwrap();
        assert_eq!(params.text.chars().count(), MAX_PARAGRAPH_CHARS);
    }

    #[test]
    fn test_user_params() {
        let params = UserParams::try_from(&json!({"user_id": "u1", "cookies": ""})).unwrap();
        assert_eq!(params.user_id, "u1");
        assert_eq!(params.cookies, None);
        assert!(UserParams::try_from(&json!({"cookies": "a=b"})).is_err());
    }

    #[test]
    fn test_caller_context_blank_values() {
        let caller = CallerContext::user(" ").with_cookies("");
        assert_eq!(caller.user_id(), None);
        assert_eq!(caller.cookies(), None);
        assert_eq!(CallerContext::user("u1").user_id(), Some("u1"));
    }
}

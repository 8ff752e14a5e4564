//! Dispatch of model-requested tool calls.
//!
//! The executor decodes the model's argument payload, fills in the caller's
//! identity for user-scoped tools, runs the tool and folds every recoverable
//! failure into a [`ToolResult::Error`] record. Only configuration errors
//! escape, since no retry by the model can fix them.

use folio_types::from_json_str;
use serde_json::{Map, Value};

use crate::error::{AgentError, Result};
use crate::tool::{CallerContext, ToolContext, ToolRegistry, ToolResult};

/// Argument carrying the caller's user id.
pub const USER_ID_FIELD: &str = "user_id";

/// Argument carrying the caller's session cookies.
pub const COOKIES_FIELD: &str = "cookies";

/// Decode a model-produced argument payload.
///
/// Unpaired surrogate escapes are dropped before decoding. Anything that
/// does not decode to a JSON object (including an empty payload) yields an
/// empty mapping.
pub fn decode_arguments(raw: &str) -> Map<String, Value> {
    match from_json_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::debug!(kind = %json_kind(&other), "Tool arguments are not an object, using empty arguments");
            Map::new()
        }
        Err(e) => {
            if !raw.trim().is_empty() {
                tracing::debug!(error = %e, "Failed to decode tool arguments, using empty arguments");
            }
            Map::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The arguments a tool actually ran with, and what it returned.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub arguments: Map<String, Value>,
    pub result: ToolResult,
}

/// Runs tools from a registry on behalf of one caller at a time.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutor {
    registry: ToolRegistry,
}

impl ToolExecutor {
    /// Create an executor over `registry`.
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Fill in identity arguments the model left out.
    ///
    /// Applies only to tools declared as requiring the caller. A field is
    /// injected when it is absent (or null) in `arguments` and the caller
    /// supplies a non-blank value for it. Returns the injected field names.
    pub fn inject_identity(
        &self,
        tool_name: &str,
        arguments: &mut Map<String, Value>,
        caller: &CallerContext,
    ) -> Vec<&'static str> {
        let user_scoped = self
            .registry
            .get(tool_name)
            .is_some_and(|tool| tool.requires_caller());
        if !user_scoped {
            return Vec::new();
        }

        let mut injected = Vec::new();
        for (field, value) in [
            (USER_ID_FIELD, caller.user_id()),
            (COOKIES_FIELD, caller.cookies()),
        ] {
            let Some(value) = value else { continue };
            let missing = arguments.get(field).is_none_or(Value::is_null);
            if missing {
                arguments.insert(field.to_string(), Value::String(value.to_string()));
                injected.push(field);
            }
        }

        if !injected.is_empty() {
            tracing::info!(
                tool = %tool_name,
                injected = %injected.join(", "),
                "Injected caller identity into tool arguments"
            );
        }
        injected
    }

    /// Invoke `tool_name` with `arguments` on behalf of `caller`.
    ///
    /// Unknown tools, invalid parameters and tool failures come back as
    /// `Ok` with an error record. Only [`AgentError::Config`] is returned as
    /// `Err`.
    pub async fn invoke(
        &self,
        tool_name: &str,
        mut arguments: Map<String, Value>,
        caller: &CallerContext,
        call_id: &str,
    ) -> Result<ToolOutcome> {
        self.inject_identity(tool_name, &mut arguments, caller);

        let ctx = ToolContext::new(call_id, caller.clone());
        let outcome = self
            .registry
            .execute(tool_name, Value::Object(arguments.clone()), &ctx)
            .await;

        let result = match outcome {
            Ok(result) => result,
            Err(e) if e.is_fatal() => {
                tracing::error!(tool = %tool_name, tool_call_id = %call_id, error = %e, "Tool configuration error");
                return Err(e);
            }
            Err(AgentError::ToolNotFound(name)) => {
                tracing::warn!(tool = %name, "Model requested an unknown tool");
                ToolResult::error(format!("Unknown tool: {}", name))
            }
            Err(e) => {
                tracing::warn!(tool = %tool_name, tool_call_id = %call_id, error = %e, "Tool execution failed");
                match e.detail() {
                    Some(detail) => ToolResult::error_with_detail(e.to_string(), detail),
                    None => ToolResult::error(e.to_string()),
                }
            }
        };

        tracing::debug!(
            tool = %tool_name,
            tool_call_id = %call_id,
            success = result.is_success(),
            "Tool: completed"
        );

        Ok(ToolOutcome { arguments, result })
    }
}

//! The conversation loop.
//!
//! One turn is a bounded sequence of cycles. Each cycle cleans the tool
//! argument payloads in the message sequence, asks the completion service for the next message and,
//! when that message requests tools, runs them in request order and appends
//! the calls and their results before asking again. A reply without tool
//! calls ends the turn; running out of cycles ends it with the configured
//! fallback answer.

use std::sync::Arc;

use folio_llm::{
    CompletionRequest, LlmBackend, Message, SharedBackend, ToolCallRequest, ToolDefinition, Usage,
};
use serde_json::Value;

use crate::error::{AgentError, Result};
use crate::executor::{ToolExecutor, decode_arguments};
use crate::prompt::SystemPromptBuilder;
use crate::sanitize::Sanitize;
use crate::schema::adapt_all;
use crate::tool::{CallerContext, Tool, ToolRegistry};
use crate::types::{AgentConfig, AgentResponse, Conversation, ToolCallRecord};

// ─────────────────────────────────────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────────────────────────────────────

/// The tool-orchestrating agent.
///
/// Immutable once built and cheap to share behind an `Arc`; all per-request
/// state lives in the [`Conversation`] passed to [`Agent::turn_in`].
pub struct Agent {
    backend: SharedBackend,
    executor: ToolExecutor,
    /// Computed once from the registry snapshot at build time.
    schemas: Vec<ToolDefinition>,
    config: AgentConfig,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("backend", &self.backend.name())
            .field("tools", self.executor.registry())
            .field("config", &self.config)
            .finish()
    }
}

impl Agent {
    /// Create a new agent.
    pub fn new(backend: SharedBackend, tools: ToolRegistry, config: AgentConfig) -> Self {
        let schemas = adapt_all(&tools.descriptors());
        Self {
            backend,
            executor: ToolExecutor::new(tools),
            schemas,
            config,
        }
    }

    /// Create a builder for configuring an agent.
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Get the agent configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Get the tool registry.
    pub fn tools(&self) -> &ToolRegistry {
        self.executor.registry()
    }

    /// Tool schemas sent with every completion request.
    pub fn schemas(&self) -> &[ToolDefinition] {
        &self.schemas
    }

    /// Get the LLM backend.
    pub fn backend(&self) -> SharedBackend {
        self.backend.clone()
    }

    /// Answer `user_message` in a fresh conversation.
    pub async fn turn(&self, user_message: &str, caller: &CallerContext) -> Result<AgentResponse> {
        let mut conversation = Conversation::new();
        self.turn_in(&mut conversation, user_message, caller).await
    }

    /// Answer `user_message` as the next turn of `conversation`.
    ///
    /// The leading system message is rebuilt for `caller`, the user message
    /// appended, and the loop runs until the model answers without
    /// tool calls or `max_iterations` completions have been requested. The
    /// final answer (or the fallback) is appended as an assistant message.
    ///
    /// Fails only on completion-service errors and on configuration errors
    /// raised by a tool.
    pub async fn turn_in(
        &self,
        conversation: &mut Conversation,
        user_message: &str,
        caller: &CallerContext,
    ) -> Result<AgentResponse> {
        conversation.set_system(self.system_prompt(caller));
        conversation.push(Message::user(user_message));

        tracing::info!(
            message_len = user_message.len(),
            has_user = caller.user_id().is_some(),
            history = conversation.len(),
            "Turn started"
        );

        let mut usage = Usage::default();
        let mut all_tool_calls = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            let messages = std::mem::take(conversation.messages_mut()).sanitize();
            *conversation.messages_mut() = messages;

            tracing::debug!(
                iteration,
                messages = conversation.len(),
                tools = self.schemas.len(),
                model = %self.config.model,
                "Calling LLM"
            );

            let response = self
                .backend
                .complete(self.build_request(conversation.messages()))
                .await
                .map_err(|e| {
                    tracing::error!(iteration, error = %e, "LLM call failed");
                    AgentError::from(e)
                })?;

            usage.input_tokens += response.usage.input_tokens;
            usage.output_tokens += response.usage.output_tokens;

            if !response.has_tool_calls() {
                let text = response.text();
                conversation.push(Message::assistant(text.clone()));

                tracing::info!(
                    iterations = iteration,
                    tool_calls = all_tool_calls.len(),
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    response_len = text.len(),
                    "Turn completed"
                );

                return Ok(AgentResponse {
                    text,
                    tool_calls: all_tool_calls,
                    iterations: iteration,
                    usage,
                    truncated: false,
                });
            }

            let calls = response.tool_calls();
            tracing::info!(
                iteration,
                tool_count = calls.len(),
                tools = %calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", "),
                "Executing tools"
            );

            let records = self.execute_tools(calls, caller).await?;

            let requested = records
                .iter()
                .map(|r| ToolCallRequest::new(&r.id, &r.name, r.arguments.to_string()))
                .collect();
            conversation.push(Message::assistant_tool_calls(
                response.message.content.clone(),
                requested,
            ));
            for record in &records {
                conversation.push(Message::tool_result(
                    &record.id,
                    &record.name,
                    record.result.to_llm_content(),
                ));
            }

            all_tool_calls.extend(records);
        }

        tracing::warn!(
            max_iterations = self.config.max_iterations,
            tool_calls = all_tool_calls.len(),
            "Max iterations exceeded, returning fallback answer"
        );

        let text = self.config.fallback_message.clone();
        conversation.push(Message::assistant(text.clone()));

        Ok(AgentResponse {
            text,
            tool_calls: all_tool_calls,
            iterations: self.config.max_iterations,
            usage,
            truncated: true,
        })
    }

    /// Run the requested calls one at a time, in request order.
    async fn execute_tools(
        &self,
        calls: &[ToolCallRequest],
        caller: &CallerContext,
    ) -> Result<Vec<ToolCallRecord>> {
        let mut records = Vec::with_capacity(calls.len());

        for call in calls {
            tracing::debug!(
                tool = %call.name,
                tool_call_id = %call.id,
                input_bytes = call.arguments.len(),
                "Tool: executing"
            );

            let arguments = decode_arguments(&call.arguments);
            let outcome = self
                .executor
                .invoke(&call.name, arguments, caller, &call.id)
                .await?;

            records.push(ToolCallRecord {
                id: call.id.clone(),
                name: call.name.clone(),
                arguments: Value::Object(outcome.arguments),
                result: outcome.result,
            });
        }

        Ok(records)
    }

    fn system_prompt(&self, caller: &CallerContext) -> String {
        SystemPromptBuilder::new()
            .with_instructions(self.config.system_prompt.as_deref())
            .with_language(self.config.response_language.as_deref())
            .with_user_tools(self.tools())
            .with_caller(caller)
            .build()
    }

    fn build_request(&self, messages: &[Message]) -> CompletionRequest {
        let mut request = CompletionRequest::new(&self.config.model, messages.to_vec())
            .with_tools(self.schemas.clone());
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }
        request
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Agent Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating an [`Agent`].
#[derive(Default)]
pub struct AgentBuilder {
    backend: Option<SharedBackend>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl AgentBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the LLM backend.
    pub fn with_backend(mut self, backend: impl LlmBackend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    /// Set a shared LLM backend.
    pub fn with_shared_backend(mut self, backend: SharedBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the tool registry.
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Add a single tool.
    pub fn with_tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    /// Set the agent configuration.
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set max iterations.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Build the agent.
    pub fn build(self) -> Result<Agent> {
        let backend = self
            .backend
            .ok_or_else(|| AgentError::config("LLM backend is required"))?;
        Ok(Agent::new(backend, self.tools, self.config))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

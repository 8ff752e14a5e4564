//! Agent configuration, conversation state and turn results.

use folio_llm::{Message, Role, Usage};
use serde::{Deserialize, Serialize};

use crate::tool::ToolResult;

/// Answer returned when a turn runs out of iterations.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "죄송합니다. 처리 중 문제가 발생했습니다.";

/// Completion requests allowed per turn.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Agent Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model identifier to use.
    pub model: String,
    /// Maximum tokens for LLM responses.
    pub max_tokens: Option<u32>,
    /// Temperature for sampling.
    pub temperature: Option<f32>,
    /// Completion requests allowed per turn.
    pub max_iterations: u32,
    /// Replacement for the built-in instructions.
    pub system_prompt: Option<String>,
    /// Language the model is told to answer in.
    pub response_language: Option<String>,
    /// Answer returned when the iteration cap is reached.
    pub fallback_message: String,
}

impl AgentConfig {
    /// Create a new config with the specified model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: None,
            temperature: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            system_prompt: None,
            response_language: Some("Korean".to_string()),
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
        }
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max iterations.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the response language, or `None` to leave it to the model.
    pub fn with_response_language(mut self, language: Option<String>) -> Self {
        self.response_language = language;
        self
    }

    /// Set the fallback answer.
    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new("gpt-4o-mini")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversation
// ─────────────────────────────────────────────────────────────────────────────

/// The message sequence of one conversation.
///
/// Owned by exactly one caller at a time; `Agent::turn_in` takes it by
/// `&mut`, so two turns can never interleave on the same conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if nothing has been said yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Forget every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Number of user messages.
    pub fn user_turns(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }

    /// Install `prompt` as the leading system message.
    pub(crate) fn set_system(&mut self, prompt: String) {
        match self.messages.first_mut() {
            Some(first) if first.role == Role::System => *first = Message::system(prompt),
            _ => self.messages.insert(0, Message::system(prompt)),
        }
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(crate) fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Turn Results
// ─────────────────────────────────────────────────────────────────────────────

/// One tool call made during a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Call id chosen by the model.
    pub id: String,
    pub name: String,
    /// Arguments the tool ran with, after identity injection.
    pub arguments: serde_json::Value,
    pub result: ToolResult,
}

/// Response from an agent turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// The final answer, or the fallback message when truncated.
    pub text: String,
    /// Tool calls made during this turn, in execution order.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Completion requests made.
    pub iterations: u32,
    /// Token usage summed over every completion.
    pub usage: Usage,
    /// Whether the iteration cap was reached.
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_config_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.fallback_message, DEFAULT_FALLBACK_MESSAGE);
        assert_eq!(config.response_language.as_deref(), Some("Korean"));
    }

    #[test]
    fn test_set_system_replaces_leading_system_message() {
        let mut conversation = Conversation::new();
        conversation.set_system("first".to_string());
        conversation.push(Message::user("hi"));
        conversation.set_system("second".to_string());

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages()[0].text(), "second");
        assert_eq!(conversation.user_turns(), 1);
    }

    #[test]
    fn test_set_system_inserts_when_missing() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("hi"));
        conversation.set_system("prompt".to_string());

        assert_eq!(conversation.messages()[0].role, Role::System);
        assert_eq!(conversation.messages()[1].text(), "hi");
    }
}

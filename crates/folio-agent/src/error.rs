//! Error types for the agent crate.

use folio_notion::NotionError;
use thiserror::Error;

/// Result type alias using the agent error type.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Error type for agent operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// LLM backend error.
    #[error("LLM error: {0}")]
    Llm(#[from] folio_llm::LlmError),

    /// Tool execution error.
    #[error("Tool error: {0}")]
    Tool(String),

    /// A service behind a tool answered with a non-success status. `detail`
    /// carries what the service said.
    #[error("Tool error: {message}")]
    ToolRejected { message: String, detail: String },

    /// Tool not found in registry.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Invalid tool parameters.
    #[error("Invalid tool parameters: {0}")]
    InvalidToolParams(String),

    /// Required configuration is missing. Fatal to the current chat request.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Create a tool error.
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::Tool(msg.into())
    }

    /// Create a rejection error with the service's answer as detail.
    pub fn rejected(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ToolRejected {
            message: message.into(),
            detail: detail.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true for errors that must abort the chat request instead of
    /// being handed back to the model as a tool result.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Extra detail for the tool error record, when the error carries any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::ToolRejected { detail, .. } if !detail.is_empty() => Some(detail),
            _ => None,
        }
    }
}

impl From<NotionError> for AgentError {
    fn from(err: NotionError) -> Self {
        match err {
            NotionError::Config(msg) => Self::Config(msg),
            NotionError::Status {
                status,
                code,
                message,
            } => Self::rejected(format!("Notion API error ({}, {})", status, code), message),
            other => Self::Tool(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::tool("boom");
        assert_eq!(err.to_string(), "Tool error: boom");

        let err = AgentError::ToolNotFound("nope".to_string());
        assert_eq!(err.to_string(), "Tool not found: nope");
    }

    #[test]
    fn test_notion_errors_map_to_categories() {
        let err: AgentError = NotionError::Config("Notion token is empty".to_string()).into();
        assert!(err.is_fatal());

        let err: AgentError = NotionError::Status {
            status: 404,
            code: "object_not_found".to_string(),
            message: "gone".to_string(),
        }
        .into();
        assert!(matches!(err, AgentError::ToolRejected { .. }));
        assert_eq!(err.to_string(), "Tool error: Notion API error (404, object_not_found)");
        assert_eq!(err.detail(), Some("gone"));
        assert!(!err.is_fatal());

        let err: AgentError = NotionError::Network("reset".to_string()).into();
        assert!(matches!(err, AgentError::Tool(_)));
        assert!(err.detail().is_none());
    }

    #[test]
    fn test_empty_detail_is_none() {
        assert!(AgentError::rejected("Failed", "").detail().is_none());
        assert_eq!(AgentError::rejected("Failed", "body").detail(), Some("body"));
    }

    #[test]
    fn test_llm_error_conversion() {
        let err: AgentError = folio_llm::LlmError::Auth("bad key".to_string()).into();
        assert!(matches!(err, AgentError::Llm(_)));
        assert!(!err.is_fatal());
    }
}

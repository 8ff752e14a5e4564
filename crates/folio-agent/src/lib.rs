//! Agent core for Folio.
//!
//! This crate provides the conversation loop, the tool framework and the
//! built-in Notion and backend tools.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Agent                                                      │
//! │  - Seeds the system prompt for the caller                   │
//! │  - Loops completion → tool calls → results, up to the cap   │
//! │  - Cleans tool argument payloads before they are decoded    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              ▼               ▼               ▼
//!       ┌──────────┐    ┌──────────┐    ┌──────────────┐
//!       │LlmBackend│    │ToolExec  │    │ Conversation │
//!       │(folio-llm)│   │+Registry │    │              │
//!       └──────────┘    └──────────┘    └──────────────┘
//! ```
//!
//! # Core Components
//!
//! - [`Agent`]: runs one user turn against a conversation
//! - [`ToolExecutor`]: decodes arguments, injects caller identity, runs tools
//! - [`adapt`]: turns tool descriptors into model-facing definitions
//! - [`strip_surrogates`]: removes lone UTF-16 surrogate escapes from raw JSON text

pub mod agent;
pub mod error;
pub mod executor;
pub mod prompt;
pub mod sanitize;
pub mod schema;
pub mod tool;
pub mod tools;
pub mod types;

// Re-export core types
pub use error::{AgentError, Result};
pub use types::{
    AgentConfig, AgentResponse, Conversation, DEFAULT_FALLBACK_MESSAGE, DEFAULT_MAX_ITERATIONS,
    ToolCallRecord,
};

// Re-export agent
pub use agent::{Agent, AgentBuilder};

// Re-export tool types
pub use tool::{CallerContext, ParamExt, ParameterValidationError, Tool, ToolContext, ToolRegistry, ToolResult};

// Re-export execution and schema types
pub use executor::{ToolExecutor, ToolOutcome, decode_arguments};
pub use prompt::SystemPromptBuilder;
pub use sanitize::{Sanitize, strip_surrogates};
pub use schema::{Exportable, ToolDescriptor, adapt, adapt_all};

// Re-export built-in tools
pub use tools::{BackendClient, standard_registry};

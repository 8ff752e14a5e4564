//! Completion-service abstraction for Folio.
//!
//! The agent talks to a language model through the [`LlmBackend`] trait. A
//! request is an ordered sequence of [`Message`]s plus the tool schema set;
//! a response is one assistant message that may request tool calls.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  LlmBackend trait                       │
//! │  - complete() -> CompletionResponse     │
//! │  - health_check()                       │
//! └─────────────────────────────────────────┘
//!                    │
//!            ┌───────┴────────┐
//!            ▼                ▼
//!     ┌────────────┐   ┌─────────────┐
//!     │   OpenAI   │   │ MockBackend │
//!     │ compatible │   │  (testing)  │
//!     └────────────┘   └─────────────┘
//! ```

pub mod backend;
pub mod error;
pub mod openai;
pub mod types;

pub use backend::{LlmBackend, MockBackend, SharedBackend, with_retry};
pub use error::{LlmError, RateLimitInfo, Result};
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use types::{
    CompletionRequest, CompletionResponse, Message, Role, StopReason, ToolCallRequest,
    ToolDefinition, Usage,
};

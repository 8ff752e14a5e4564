//! API routes.

pub mod chat;
pub mod health;

pub use chat::{ChatRequest, ChatResponse, chat_handler};
pub use health::{health_routes, root};

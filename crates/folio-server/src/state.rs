//! Application state shared across handlers.

use std::sync::Arc;

use folio_agent::Agent;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// Requests never share a conversation; the agent itself is read-only.
#[derive(Clone)]
pub struct AppState {
    /// The agent instance.
    pub agent: Arc<Agent>,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(agent: Agent, config: ServerConfig) -> Self {
        Self {
            agent: Arc::new(agent),
            config: Arc::new(config),
        }
    }
}

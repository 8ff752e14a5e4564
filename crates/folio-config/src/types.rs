//! Configuration types.
//!
//! The file format:
//!
//! ```toml
//! [llm]
//! model = "gpt-4o-mini"
//!
//! [notion]
//! api_version = "2022-06-28"
//!
//! [backend]
//! base_url = "http://localhost:8080"
//!
//! [server]
//! bind = "0.0.0.0:8081"
//! cors_origins = ["http://localhost:3000"]
//!
//! [agent]
//! max_iterations = 10
//! response_language = "Korean"
//! ```

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Environment variable holding the completion-service API key.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding the completion model.
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
/// Environment variable overriding the completion-service base URL.
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
/// Environment variable holding the server-wide Notion integration token.
pub const ENV_NOTION_TOKEN: &str = "NOTION_TOKEN";
/// Environment variable overriding the backend API base URL.
pub const ENV_BACKEND_BASE_URL: &str = "BACKEND_BASE_URL";
/// Environment variable overriding the HTTP bind address.
pub const ENV_BIND: &str = "FOLIO_BIND";

// ─────────────────────────────────────────────────────────────────────────────
// Root
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub llm: LlmSection,
    pub notion: NotionSection,
    pub backend: BackendSection,
    pub server: ServerSection,
    pub agent: AgentSection,
}

impl FolioConfig {
    /// Create a config with every default applied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document. Missing sections and fields take defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another file layer on top of this one.
    ///
    /// Layers are merged at the TOML value level so a project file that only
    /// sets `[server] bind` keeps the user file's `cors_origins`.
    pub(crate) fn merge_toml(base: &mut toml::Table, layer: toml::Table) {
        for (key, value) in layer {
            match (base.get_mut(&key), value) {
                (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                    Self::merge_toml(existing, incoming);
                }
                (_, value) => {
                    base.insert(key, value);
                }
            }
        }
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_OPENAI_API_KEY) {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = get(ENV_OPENAI_MODEL) {
            self.llm.model = model;
        }
        if let Some(url) = get(ENV_OPENAI_BASE_URL) {
            self.llm.base_url = Some(url);
        }
        if let Some(token) = get(ENV_NOTION_TOKEN) {
            self.notion.token = Some(token);
        }
        if let Some(url) = get(ENV_BACKEND_BASE_URL) {
            self.backend.base_url = url;
        }
        if let Some(bind) = get(ENV_BIND) {
            self.server.bind = bind;
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_process_env(&mut self) {
        self.apply_env(|name| std::env::var(name).ok());
    }

    /// Names of the environment variables whose credentials are absent.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.llm.api_key.is_none() {
            missing.push(ENV_OPENAI_API_KEY);
        }
        if self.notion.token.is_none() {
            missing.push(ENV_NOTION_TOKEN);
        }
        missing
    }

    /// The completion-service API key, or an explanatory error.
    pub fn require_llm_key(&self) -> Result<&str> {
        self.llm
            .api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingCredential {
                name: "OpenAI API key".to_string(),
                env_var: ENV_OPENAI_API_KEY.to_string(),
            })
    }

    /// Check values that parse but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "agent.max_iterations".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.agent.max_depth > 100 {
            return Err(ConfigError::Invalid {
                field: "agent.max_depth".to_string(),
                reason: "must be at most 100".to_string(),
            });
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

/// Completion service (`[llm]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// Model name sent with every request.
    pub model: String,
    /// OpenAI-compatible base URL; the public API when unset.
    pub base_url: Option<String>,
    /// API key. Prefer `OPENAI_API_KEY` over storing it here.
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            api_key: None,
            max_tokens: None,
            temperature: None,
            timeout_secs: 300,
            max_retries: 3,
        }
    }
}

/// Content source (`[notion]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionSection {
    /// Server-wide integration token. Prefer `NOTION_TOKEN`.
    pub token: Option<String>,
    pub api_base: String,
    /// Value of the `Notion-Version` header.
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for NotionSection {
    fn default() -> Self {
        Self {
            token: None,
            api_base: "https://api.notion.com/v1".to_string(),
            api_version: "2022-06-28".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Backend API used by the user-scoped tools (`[backend]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

/// HTTP front door (`[server]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    /// Origins allowed to call the API with credentials.
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8081".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            max_body_size: 1024 * 1024,
        }
    }
}

/// Orchestration loop (`[agent]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// Completion cycles allowed per request before giving up.
    pub max_iterations: u32,
    /// Default descent depth for document retrieval.
    pub max_depth: u32,
    /// Language the model is told to answer in. `None` leaves it free.
    pub response_language: Option<String>,
    /// Answer returned when the iteration cap is hit.
    pub fallback_message: String,
    /// Replaces the built-in instructions when set.
    pub system_prompt: Option<String>,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            max_depth: 10,
            response_language: Some("Korean".to_string()),
            fallback_message: "죄송합니다. 처리 중 문제가 발생했습니다.".to_string(),
            system_prompt: None,
        }
    }
}

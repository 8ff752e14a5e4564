//! Wiring configuration into a ready agent.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use folio_agent::{Agent, AgentConfig, BackendClient, standard_registry};
use folio_config::FolioConfig;
use folio_llm::{OpenAiBackend, OpenAiConfig};
use folio_notion::{ClientCache, NotionClient, NotionConfig, SharedSource};

/// Load every config layer, then apply environment overrides and validate.
pub fn load_config(explicit: Option<&Path>) -> Result<FolioConfig> {
    let loaded = folio_config::load_config_with_options(None, None, explicit)?;

    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }
    tracing::debug!(sources = ?loaded.loaded_from(), "Configuration loaded");

    let mut config = loaded.config;
    config.apply_process_env();
    config.validate()?;
    Ok(config)
}

/// Orchestrator settings from the `[llm]` and `[agent]` sections.
pub fn agent_config(config: &FolioConfig) -> AgentConfig {
    AgentConfig {
        model: config.llm.model.clone(),
        max_tokens: config.llm.max_tokens,
        temperature: config.llm.temperature,
        max_iterations: config.agent.max_iterations,
        system_prompt: config.agent.system_prompt.clone(),
        response_language: config.agent.response_language.clone(),
        fallback_message: config.agent.fallback_message.clone(),
    }
}

/// Notion endpoint settings with no token filled in.
fn notion_template(config: &FolioConfig) -> NotionConfig {
    NotionConfig::new("")
        .with_api_base(&config.notion.api_base)
        .with_api_version(&config.notion.api_version)
        .with_timeout(Duration::from_secs(config.notion.timeout_secs))
}

/// Build the completion backend, the tool set and the agent.
///
/// Fails without a completion-service key. A missing Notion token only
/// disables the server-token tools.
pub fn build_agent(config: &FolioConfig) -> Result<Agent> {
    let api_key = config.require_llm_key()?;

    let mut llm = OpenAiConfig::openai(api_key)
        .with_model(&config.llm.model)
        .with_timeout(Duration::from_secs(config.llm.timeout_secs))
        .with_max_retries(config.llm.max_retries);
    if let Some(ref base_url) = config.llm.base_url {
        llm = llm.with_base_url(base_url);
    }
    let backend = OpenAiBackend::new(llm)?;

    let template = notion_template(config);
    let server_source: Option<SharedSource> = match config
        .notion
        .token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
    {
        Some(token) => Some(Arc::new(NotionClient::new(template.for_token(token))?) as SharedSource),
        None => {
            tracing::warn!("NOTION_TOKEN is not set; server-token Notion tools will report a configuration error");
            None
        }
    };

    let backend_client = BackendClient::new(
        &config.backend.base_url,
        Duration::from_secs(config.backend.timeout_secs),
    )?;
    let tools = standard_registry(
        server_source,
        backend_client,
        Arc::new(ClientCache::notion(template)),
        config.agent.max_depth,
    );

    let agent = Agent::builder()
        .with_backend(backend)
        .with_tools(tools)
        .with_config(agent_config(config))
        .build()?;

    tracing::info!(
        model = %config.llm.model,
        tools = agent.tools().len(),
        "Agent ready"
    );
    Ok(agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_config_from_sections() {
        let mut config = FolioConfig::new();
        config.llm.model = "gpt-4o".to_string();
        config.llm.temperature = Some(0.2);
        config.agent.max_iterations = 4;
        config.agent.response_language = None;

        let agent = agent_config(&config);
        assert_eq!(agent.model, "gpt-4o");
        assert_eq!(agent.temperature, Some(0.2));
        assert_eq!(agent.max_iterations, 4);
        assert_eq!(agent.response_language, None);
        assert_eq!(agent.fallback_message, folio_agent::DEFAULT_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_build_agent_requires_llm_key() {
        let config = FolioConfig::new();
        let err = build_agent(&config).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_build_agent_without_notion_token() {
        let mut config = FolioConfig::new();
        config.llm.api_key = Some("sk-test".to_string());

        let agent = build_agent(&config).unwrap();
        assert_eq!(agent.tools().len(), 7);
        assert_eq!(agent.schemas().len(), 7);
        assert_eq!(agent.config().model, "gpt-4o-mini");
    }
}

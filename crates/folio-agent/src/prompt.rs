//! System prompt assembly.
//!
//! The prompt is rebuilt for every chat request because the authentication
//! section names the caller's identity and credential values verbatim.

use crate::tool::{CallerContext, ToolRegistry};

/// Instructions used when no override is configured.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant with access to Notion tools and a backend API. \
When the user asks about their Notion content, use the available tools to search and retrieve information. \
If the user asks to update or save Notion data, you should also call the backend API.";

/// Builder for the system message that seeds a conversation.
///
/// # Example
///
/// ```rust,ignore
/// let prompt = SystemPromptBuilder::new()
///     .with_language(Some("Korean"))
///     .with_user_tools(&registry)
///     .with_caller(&caller)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct SystemPromptBuilder {
    instructions: Option<String>,
    language: Option<String>,
    user_tools: Vec<String>,
    caller: CallerContext,
}

impl SystemPromptBuilder {
    /// Create a new builder with the default instructions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default instructions.
    pub fn with_instructions(mut self, instructions: Option<&str>) -> Self {
        self.instructions = instructions
            .filter(|s| !s.trim().is_empty())
            .map(String::from);
        self
    }

    /// Ask the model to always answer in `language`.
    pub fn with_language(mut self, language: Option<&str>) -> Self {
        self.language = language.filter(|s| !s.trim().is_empty()).map(String::from);
        self
    }

    /// Record which tools act on behalf of the caller.
    pub fn with_user_tools(mut self, registry: &ToolRegistry) -> Self {
        self.user_tools = registry
            .names()
            .into_iter()
            .filter(|name| registry.get(name).is_some_and(|t| t.requires_caller()))
            .map(String::from)
            .collect();
        self
    }

    /// Set the caller of this chat request.
    pub fn with_caller(mut self, caller: &CallerContext) -> Self {
        self.caller = caller.clone();
        self
    }

    /// Build the final system prompt string.
    pub fn build(self) -> String {
        let mut prompt = self
            .instructions
            .clone()
            .unwrap_or_else(|| DEFAULT_INSTRUCTIONS.to_string());

        if let Some(language) = &self.language {
            prompt.push_str(&format!(" Always respond in {}.", language));
        }
        prompt.push_str(&format!(
            " Current user ID: {}",
            self.caller.user_id().unwrap_or("Not provided")
        ));

        if let Some(auth) = self.build_auth_section() {
            prompt.push('\n');
            prompt.push_str(&auth);
        }
        prompt
    }

    /// `user_id="…", cookies="…"` as the model must pass them.
    fn auth_arguments(&self) -> Option<String> {
        let user_id = self.caller.user_id()?;
        let mut args = format!("user_id=\"{}\"", user_id);
        if let Some(cookies) = self.caller.cookies() {
            args.push_str(&format!(", cookies=\"{}\"", cookies));
        }
        Some(args)
    }

    fn build_auth_section(&self) -> Option<String> {
        let args = self.auth_arguments()?;
        let user_id = self.caller.user_id()?;

        let mut lines = vec![
            "IMPORTANT AUTHENTICATION RULES:".to_string(),
            format!("- User ID: {}", user_id),
            format!(
                "- MANDATORY: When calling ANY user-specific tool, you MUST include these exact parameters: {}",
                args
            ),
        ];

        if !self.user_tools.is_empty() {
            lines.push(format!(
                "- User-specific tools: {}. Prefer the '_with_user' variants over the basic Notion tools.",
                self.user_tools.join(", ")
            ));
        }
        lines.extend([
            "- ALWAYS use 'get_user_info' with cookies before any Notion operations".to_string(),
            "- The backend API returns lowercase fields: 'access_token', 'refresh_token', etc.".to_string(),
            format!(
                "- Example tool call: notion_search_with_user({}, query=\"search term\")",
                args
            ),
            "- If you get an access_token from the backend, the user HAS authorized Notion access.".to_string(),
            "- NOTE: Authentication parameters will be automatically added to tool calls if missing.".to_string(),
        ]);

        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::MockTool;

    #[test]
    fn test_anonymous_prompt() {
        let prompt = SystemPromptBuilder::new().with_language(Some("Korean")).build();
        assert!(prompt.starts_with(DEFAULT_INSTRUCTIONS));
        assert!(prompt.contains("Always respond in Korean."));
        assert!(prompt.ends_with("Current user ID: Not provided"));
        assert!(!prompt.contains("AUTHENTICATION"));
    }

    #[test]
    fn test_auth_section_names_identity_verbatim() {
        let caller = CallerContext::user("u-42").with_cookies("access_token=abc; theme=dark");
        let prompt = SystemPromptBuilder::new().with_caller(&caller).build();

        assert!(prompt.contains("Current user ID: u-42"));
        assert!(prompt.contains(
            r#"you MUST include these exact parameters: user_id="u-42", cookies="access_token=abc; theme=dark""#
        ));
    }

    #[test]
    fn test_auth_section_without_cookies() {
        let prompt = SystemPromptBuilder::new()
            .with_caller(&CallerContext::user("u-1"))
            .build();
        assert!(prompt.contains(r#"exact parameters: user_id="u-1""#));
        assert!(!prompt.contains("cookies=\""));
    }

    #[test]
    fn test_user_tools_listed() {
        let mut registry = ToolRegistry::new();
        registry.register(MockTool::new("notion_search"));
        registry.register(MockTool::new("get_user_info").user_scoped());

        let prompt = SystemPromptBuilder::new()
            .with_user_tools(&registry)
            .with_caller(&CallerContext::user("u"))
            .build();
        assert!(prompt.contains("User-specific tools: get_user_info."));
    }

    #[test]
    fn test_instruction_override() {
        let prompt = SystemPromptBuilder::new()
            .with_instructions(Some("Custom."))
            .with_language(None)
            .build();
        assert_eq!(prompt, "Custom. Current user ID: Not provided");
    }
}

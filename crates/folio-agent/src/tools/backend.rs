//! Backend API client and the tools built on it.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url, header};
use serde_json::{Value, json};
use std::time::Duration;

use folio_types::from_json_str;

use crate::error::{AgentError, Result};
use crate::tool::{
    ParamExt, ParameterValidationError, Tool, ToolContext, ToolResult, UserParams,
    identity_properties,
};

/// Cookie names that carry a bearer token.
const TOKEN_COOKIES: [&str; 2] = ["access_token", "accessToken"];

/// Find a bearer token in a `Cookie` header value.
pub fn cookie_token(cookies: &str) -> Option<&str> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| TOKEN_COOKIES.contains(&name.trim()))
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Client
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client for the application backend that stores users and their
/// saved Notion pages.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a client for `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::config(format!("Failed to create HTTP client: {}", e)))?;

        let raw = base_url.into();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| AgentError::config(format!("Invalid backend URL '{}': {}", raw, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AgentError::config(format!("Invalid backend URL '{}'", raw)));
        }

        Ok(Self { client, base_url })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// `{base}/api/users/{user_id}[/{suffix}]`, with `user_id` encoded as a
    /// single path segment.
    fn user_url(&self, user_id: &str, suffix: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AgentError::internal(format!("Backend URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "users", user_id])
            .extend(suffix);
        Ok(url)
    }

    /// Forward the caller's session: the raw cookie string, plus a bearer
    /// token when the cookie jar holds one.
    fn with_session(builder: RequestBuilder, cookies: Option<&str>) -> RequestBuilder {
        let Some(cookies) = cookies else {
            return builder;
        };
        let builder = builder.header(header::COOKIE, cookies);
        match cookie_token(cookies) {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, accepted: &[StatusCode], what: &str) -> Result<Value> {
        let response = builder
            .send()
            .await
            .map_err(|e| AgentError::tool(format!("Backend request failed ({}): {}", what, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::tool(format!("Failed to read backend response: {}", e)))?;

        if !accepted.contains(&status) {
            tracing::warn!(status = status.as_u16(), operation = what, "Backend request rejected");
            return Err(AgentError::rejected(
                format!("Failed to {} (status {})", what, status.as_u16()),
                body.trim(),
            ));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        from_json_str(&body)
            .map_err(|e| AgentError::tool(format!("Invalid backend response ({}): {}", what, e)))
    }

    /// `GET /api/users/{user_id}`.
    pub async fn get_user(&self, user_id: &str, cookies: Option<&str>) -> Result<Value> {
        let builder = Self::with_session(self.client.get(self.user_url(user_id, None)?), cookies);
        self.send(builder, &[StatusCode::OK], "get user info").await
    }

    /// `POST /api/users/{user_id}/notion`.
    pub async fn save_notion_page(
        &self,
        user_id: &str,
        cookies: Option<&str>,
        page_id: &str,
        text: &str,
    ) -> Result<Value> {
        let builder = Self::with_session(
            self.client
                .post(self.user_url(user_id, Some("notion"))?)
                .json(&json!({"notionPageId": page_id, "notionPageText": text})),
            cookies,
        );
        self.send(
            builder,
            &[StatusCode::OK, StatusCode::CREATED],
            "save notion data",
        )
        .await
    }

    /// The user's Notion access token, from their backend record.
    pub async fn notion_token(&self, user: &UserParams) -> Result<String> {
        let record = self.get_user(&user.user_id, user.cookies.as_deref()).await?;
        record
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|token| !token.trim().is_empty())
            .map(String::from)
            .ok_or_else(|| {
                AgentError::tool(format!(
                    "User {} has not authorized Notion access (no access_token)",
                    user.user_id
                ))
            })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────────────────────────────────────

/// Looks up the current user's backend record.
#[derive(Debug, Clone)]
pub struct GetUserInfoTool {
    backend: BackendClient,
}

impl GetUserInfoTool {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for GetUserInfoTool {
    fn name(&self) -> &str {
        "get_user_info"
    }

    fn description(&self) -> &str {
        "Get the current user's record from the backend, including their Notion access_token when they have authorized Notion."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": identity_properties(),
            "required": ["user_id"]
        })
    }

    fn requires_caller(&self) -> bool {
        true
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<ToolResult> {
        let user = UserParams::try_from(&params)?;
        let record = self
            .backend
            .get_user(&user.user_id, user.cookies.as_deref())
            .await?;
        Ok(ToolResult::json(record))
    }
}

/// Saves a Notion page's text to the current user's backend record.
#[derive(Debug, Clone)]
pub struct SaveNotionPageTool {
    backend: BackendClient,
}

impl SaveNotionPageTool {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for SaveNotionPageTool {
    fn name(&self) -> &str {
        "save_notion_page"
    }

    fn description(&self) -> &str {
        "Save the text of a Notion page to the backend for the current user."
    }

    fn parameters(&self) -> Value {
        let mut properties = identity_properties();
        properties.insert(
            "page_id".to_string(),
            json!({"type": "string", "description": "Notion page id"}),
        );
        properties.insert(
            "text".to_string(),
            json!({"type": "string", "description": "Page text to save"}),
        );
        json!({
            "type": "object",
            "properties": properties,
            "required": ["user_id", "page_id", "text"]
        })
    }

    fn requires_caller(&self) -> bool {
        true
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<ToolResult> {
        let user = UserParams::try_from(&params)?;
        let page_id = params.required_str("page_id", "provide the id of the Notion page")?;
        let text = params
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| ParameterValidationError::missing("text", "provide the page text to save"))?;

        let saved = self
            .backend
            .save_notion_page(&user.user_id, user.cookies.as_deref(), page_id, text)
            .await?;
        Ok(ToolResult::json(saved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_token() {
        assert_eq!(cookie_token("access_token=abc"), Some("abc"));
        assert_eq!(cookie_token("theme=dark; accessToken=xyz "), Some("xyz"));
        assert_eq!(cookie_token("session=1; theme=dark"), None);
        assert_eq!(cookie_token("access_token="), None);
        assert_eq!(cookie_token(""), None);
    }

    #[test]
    fn test_base_url_trimmed() {
        let client = BackendClient::new("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(
            client.user_url("u1", Some("notion")).unwrap().as_str(),
            "http://localhost:8080/api/users/u1/notion"
        );
        assert_eq!(
            client.user_url("u1", None).unwrap().as_str(),
            "http://localhost:8080/api/users/u1"
        );
    }

    #[test]
    fn test_user_id_is_one_path_segment() {
        let client = BackendClient::new("http://localhost:8080", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.user_url("u1/notion", None).unwrap().as_str(),
            "http://localhost:8080/api/users/u1%2Fnotion"
        );
        assert_eq!(
            client.user_url("a?admin=1", Some("notion")).unwrap().as_str(),
            "http://localhost:8080/api/users/a%3Fadmin=1/notion"
        );
    }

    #[test]
    fn test_base_url_with_prefix() {
        let client = BackendClient::new("http://localhost:8080/backend/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.user_url("u1", None).unwrap().as_str(),
            "http://localhost:8080/backend/api/users/u1"
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = BackendClient::new("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_user_tools_require_caller() {
        let client = BackendClient::new("http://localhost", Duration::from_secs(5)).unwrap();
        assert!(GetUserInfoTool::new(client.clone()).requires_caller());
        let save = SaveNotionPageTool::new(client);
        assert!(save.requires_caller());
        assert_eq!(save.parameters()["required"], json!(["user_id", "page_id", "text"]));
    }
}

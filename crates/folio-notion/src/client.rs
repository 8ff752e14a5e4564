//! Notion REST API client.
//!
//! Implements [`ContentSource`] over the public API with bearer-token auth
//! and a pinned `Notion-Version` header.

use async_trait::async_trait;
use folio_types::from_json_str;
use reqwest::{Client, RequestBuilder, Response, Url, header};
use serde_json::{Value, json};
use std::time::Duration;

use crate::error::{NotionError, Result};
use crate::source::ContentSource;
use crate::types::{ChildPage, ContentNode, PageMeta, SearchHit};

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.notion.com/v1";

/// Default API version header value.
pub const DEFAULT_API_VERSION: &str = "2022-06-28";

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for a [`NotionClient`].
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Integration token or a user's OAuth access token.
    pub token: String,
    pub api_base: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl NotionConfig {
    /// Create a config for the public API.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Point the client at a different base URL.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the `Notion-Version` header value.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Same endpoint settings, different token.
    pub fn for_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..self.clone()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client for the Notion API.
pub struct NotionClient {
    client: Client,
    base: Url,
    config: NotionConfig,
}

impl std::fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionClient")
            .field("api_base", &self.config.api_base)
            .field("api_version", &self.config.api_version)
            .finish_non_exhaustive()
    }
}

impl NotionClient {
    /// Create a new client.
    pub fn new(config: NotionConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(NotionError::Config("Notion token is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotionError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let base = Url::parse(&config.api_base)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| NotionError::Config(format!("Invalid API base URL: {}", config.api_base)))?;

        Ok(Self {
            client,
            base,
            config,
        })
    }

    /// The API base followed by `segments`, each encoded as one path segment.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| NotionError::Config(format!("Invalid API base URL: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Add authentication and version headers to a request.
    fn add_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.token),
            )
            .header("Notion-Version", &self.config.api_version)
            .header(header::CONTENT_TYPE, "application/json")
    }

    /// Send a request and decode the JSON body of a success response.
    async fn send(&self, builder: RequestBuilder) -> Result<Value> {
        let response = self.add_headers(builder).send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response(response: Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return from_json_str(&body).map_err(NotionError::from);
        }

        let (code, message) = match from_json_str::<NotionErrorBody>(&body) {
            Ok(err) => (err.code, err.message),
            Err(_) => ("unknown".to_string(), body),
        };
        Err(NotionError::Status {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

#[derive(Debug, serde::Deserialize)]
struct NotionErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[async_trait]
impl ContentSource for NotionClient {
    async fn retrieve(&self, id: &str) -> Result<PageMeta> {
        let body = self
            .send(self.client.get(self.url(&["pages", id])?))
            .await?;
        Ok(PageMeta::from_object(&body))
    }

    async fn list_children(
        &self,
        id: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<ChildPage> {
        let mut query = vec![("page_size", page_size.to_string())];
        if let Some(cursor) = cursor {
            query.push(("start_cursor", cursor.to_string()));
        }

        tracing::trace!(block_id = %id, cursor = ?cursor, "Listing block children");

        let body = self
            .send(
                self.client
                    .get(self.url(&["blocks", id, "children"])?)
                    .query(&query),
            )
            .await?;
        Ok(ChildPage::from_response(&body))
    }

    async fn search(&self, query: &str, page_size: u32) -> Result<Vec<SearchHit>> {
        let body = self
            .send(
                self.client
                    .post(self.url(&["search"])?)
                    .json(&json!({"query": query, "page_size": page_size})),
            )
            .await?;

        Ok(body
            .get("results")
            .and_then(Value::as_array)
            .map(|results| results.iter().map(SearchHit::from_object).collect())
            .unwrap_or_default())
    }

    async fn append_child(&self, id: &str, node: &ContentNode) -> Result<Option<String>> {
        let body = self
            .send(
                self.client
                    .patch(self.url(&["blocks", id, "children"])?)
                    .json(&json!({"children": [node.to_block()]})),
            )
            .await?;

        Ok(body
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(|block| block.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

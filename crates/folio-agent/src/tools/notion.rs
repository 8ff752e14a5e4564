//! Notion tools.
//!
//! The basic tools act with the server's integration token. The `_with_user`
//! variants resolve the caller's own access token through the backend and
//! reuse one cached client per token.

use async_trait::async_trait;
use folio_notion::{ClientCache, ContentNode, ContentSource, SharedSource, fetch, render_document};
use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::tool::{
    AppendParams, DEFAULT_MAX_DEPTH, PageContentParams, SearchParams, Tool, ToolContext, ToolResult, UserParams,
    identity_properties,
};
use crate::tools::backend::BackendClient;

// ─────────────────────────────────────────────────────────────────────────────
// Operations
// ─────────────────────────────────────────────────────────────────────────────

/// Search pages and databases: a list of `{id, type, url, title}`.
pub async fn search(source: &dyn ContentSource, params: &SearchParams) -> Result<ToolResult> {
    let hits = source.search(&params.query, params.top_k).await?;
    tracing::debug!(query_len = params.query.len(), hits = hits.len(), "Notion search");
    Ok(ToolResult::json(serde_json::to_value(hits)?))
}

/// Read a page as `{page_id, title, format, content}`.
pub async fn page_content(
    source: &dyn ContentSource,
    params: &PageContentParams,
) -> Result<ToolResult> {
    let page = source.retrieve(&params.page_id).await?;
    let nodes = fetch(source, &params.page_id, params.max_depth).await?;
    let content = render_document(&nodes, params.mode);

    tracing::debug!(
        page_id = %params.page_id,
        blocks = nodes.iter().map(ContentNode::count).sum::<usize>(),
        content_len = content.len(),
        "Rendered page content"
    );

    Ok(ToolResult::json(json!({
        "page_id": params.page_id,
        "title": page.title,
        "format": params.mode.format_name(),
        "content": content,
    })))
}

/// Append one paragraph block to a page.
pub async fn append_paragraph(source: &dyn ContentSource, params: &AppendParams) -> Result<ToolResult> {
    let block_id = source
        .append_child(&params.page_id, &ContentNode::paragraph(&params.text))
        .await?;
    Ok(ToolResult::json(json!({
        "page_id": params.page_id,
        "appended_block_id": block_id,
    })))
}

// ─────────────────────────────────────────────────────────────────────────────
// Sources
// ─────────────────────────────────────────────────────────────────────────────

/// The server's own content source, if a token was configured.
#[derive(Clone, Default)]
pub struct ServerSource {
    source: Option<SharedSource>,
}

impl std::fmt::Debug for ServerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSource")
            .field("configured", &self.source.is_some())
            .finish()
    }
}

impl ServerSource {
    /// Wrap the server's source; `None` when no token is configured.
    pub fn new(source: Option<SharedSource>) -> Self {
        Self { source }
    }

    /// The source, or a configuration error naming the missing token.
    pub fn get(&self) -> Result<&dyn ContentSource> {
        self.source.as_deref().ok_or_else(|| {
            AgentError::config(
                "NOTION_TOKEN is not set; configure [notion].token or the NOTION_TOKEN environment variable",
            )
        })
    }
}

/// Content sources acting with each user's own access token.
#[derive(Debug, Clone)]
pub struct UserSources {
    backend: BackendClient,
    cache: Arc<ClientCache>,
}

impl UserSources {
    pub fn new(backend: BackendClient, cache: Arc<ClientCache>) -> Self {
        Self { backend, cache }
    }

    /// Resolve the user's access token and return the client for it.
    pub async fn source_for(&self, user: &UserParams) -> Result<SharedSource> {
        let token = self.backend.notion_token(user).await?;
        self.cache
            .source_for(&token)
            .map_err(|e| AgentError::tool(format!("Cannot use the user's Notion token: {}", e)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Schemas
// ─────────────────────────────────────────────────────────────────────────────

fn search_properties() -> Map<String, Value> {
    let mut props = Map::new();
    props.insert(
        "query".to_string(),
        json!({"type": "string", "description": "Full-text search query"}),
    );
    props.insert(
        "top_k".to_string(),
        json!({"type": "integer", "description": "Maximum number of results", "default": 5, "minimum": 1, "maximum": 100}),
    );
    props
}

fn page_content_properties(default_depth: u32) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert(
        "page_id".to_string(),
        json!({"type": "string", "description": "Notion page id"}),
    );
    props.insert(
        "format".to_string(),
        json!({"type": "string", "enum": ["markdown", "plain"], "default": "markdown", "description": "Output format"}),
    );
    props.insert(
        "max_depth".to_string(),
        json!({"type": "integer", "default": default_depth, "minimum": 0, "maximum": 100, "description": "How many levels of nested blocks to read"}),
    );
    props
}

fn with_identity(props: Map<String, Value>) -> Map<String, Value> {
    let mut all = identity_properties();
    all.extend(props);
    all
}

// ─────────────────────────────────────────────────────────────────────────────
// Server-token tools
// ─────────────────────────────────────────────────────────────────────────────

/// Searches the workspace with the server token.
#[derive(Debug, Clone)]
pub struct NotionSearchTool {
    source: ServerSource,
}

impl NotionSearchTool {
    pub fn new(source: ServerSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for NotionSearchTool {
    fn name(&self) -> &str {
        "notion_search"
    }

    fn description(&self) -> &str {
        "Search the Notion workspace for pages and databases. Returns a list of items with id, type, url and title."
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": search_properties(), "required": ["query"]})
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<ToolResult> {
        let source = self.source.get()?;
        let params = SearchParams::try_from(&params)?;
        search(source, &params).await
    }
}

/// Reads a page with the server token.
#[derive(Debug, Clone)]
pub struct NotionPageContentTool {
    source: ServerSource,
    default_depth: u32,
}

impl NotionPageContentTool {
    pub fn new(source: ServerSource) -> Self {
        Self {
            source,
            default_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Depth used when the model gives no `max_depth`.
    pub fn with_default_depth(mut self, depth: u32) -> Self {
        self.default_depth = depth;
        self
    }
}

#[async_trait]
impl Tool for NotionPageContentTool {
    fn name(&self) -> &str {
        "notion_page_content"
    }

    fn description(&self) -> &str {
        "Get the body of a Notion page as markdown or plain text, including nested blocks."
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": page_content_properties(self.default_depth), "required": ["page_id"]})
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<ToolResult> {
        let source = self.source.get()?;
        let params = PageContentParams::parse(&params, self.default_depth)?;
        page_content(source, &params).await
    }
}

/// Appends a paragraph with the server token.
#[derive(Debug, Clone)]
pub struct NotionAppendParagraphTool {
    source: ServerSource,
}

impl NotionAppendParagraphTool {
    pub fn new(source: ServerSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for NotionAppendParagraphTool {
    fn name(&self) -> &str {
        "notion_append_paragraph"
    }

    fn description(&self) -> &str {
        "Append a paragraph block to an existing Notion page. Returns the page id and the id of the new block."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "page_id": {"type": "string", "description": "Notion page id"},
                "text": {"type": "string", "description": "Plain paragraph text (at most 2000 characters are kept)"}
            },
            "required": ["page_id", "text"]
        })
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<ToolResult> {
        let source = self.source.get()?;
        let params = AppendParams::try_from(&params)?;
        append_paragraph(source, &params).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User-token tools
// ─────────────────────────────────────────────────────────────────────────────

/// Searches the workspace with the caller's own token.
#[derive(Debug, Clone)]
pub struct NotionSearchWithUserTool {
    users: UserSources,
}

impl NotionSearchWithUserTool {
    pub fn new(users: UserSources) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Tool for NotionSearchWithUserTool {
    fn name(&self) -> &str {
        "notion_search_with_user"
    }

    fn description(&self) -> &str {
        "Search the current user's Notion workspace with their own access token. Returns id, type, url and title per item."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": with_identity(search_properties()),
            "required": ["user_id", "query"]
        })
    }

    fn requires_caller(&self) -> bool {
        true
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<ToolResult> {
        let user = UserParams::try_from(&params)?;
        let search_params = SearchParams::try_from(&params)?;
        let source = self.users.source_for(&user).await?;
        search(source.as_ref(), &search_params).await
    }
}

/// Reads a page with the caller's own token.
#[derive(Debug, Clone)]
pub struct NotionPageContentWithUserTool {
    users: UserSources,
    default_depth: u32,
}

impl NotionPageContentWithUserTool {
    pub fn new(users: UserSources) -> Self {
        Self {
            users,
            default_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Depth used when the model gives no `max_depth`.
    pub fn with_default_depth(mut self, depth: u32) -> Self {
        self.default_depth = depth;
        self
    }
}

#[async_trait]
impl Tool for NotionPageContentWithUserTool {
    fn name(&self) -> &str {
        "notion_page_content_with_user"
    }

    fn description(&self) -> &str {
        "Get the body of one of the current user's Notion pages as markdown or plain text, using their own access token."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": with_identity(page_content_properties(self.default_depth)),
            "required": ["user_id", "page_id"]
        })
    }

    fn requires_caller(&self) -> bool {
        true
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<ToolResult> {
        let user = UserParams::try_from(&params)?;
        let page_params = PageContentParams::parse(&params, self.default_depth)?;
        let source = self.users.source_for(&user).await?;
        page_content(source.as_ref(), &page_params).await
    }
}

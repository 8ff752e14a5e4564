//! Built-in tools for the agent.
//!
//! - Notion search, page reading and appending with the server token
//! - `_with_user` Notion variants acting with the caller's own token
//! - Backend user lookup and page saving

mod backend;
mod notion;

use folio_notion::{ClientCache, SharedSource};
use std::sync::Arc;

use crate::tool::ToolRegistry;

// Backend tools
pub use backend::{BackendClient, GetUserInfoTool, SaveNotionPageTool, cookie_token};

// Notion tools
pub use notion::{
    NotionAppendParagraphTool, NotionPageContentTool, NotionPageContentWithUserTool,
    NotionSearchTool, NotionSearchWithUserTool, ServerSource, UserSources, append_paragraph,
    page_content, search,
};

/// Register every built-in tool.
///
/// `server` is the content source for the server's own token; without one the
/// basic Notion tools stay registered and answer with a configuration error.
/// `default_depth` is the page descent depth when the model gives none.
pub fn standard_registry(
    server: Option<SharedSource>,
    backend: BackendClient,
    cache: Arc<ClientCache>,
    default_depth: u32,
) -> ToolRegistry {
    let server = ServerSource::new(server);
    let users = UserSources::new(backend.clone(), cache);

    let mut registry = ToolRegistry::new();
    registry.register(NotionSearchTool::new(server.clone()));
    registry.register(NotionPageContentTool::new(server.clone()).with_default_depth(default_depth));
    registry.register(NotionAppendParagraphTool::new(server));
    registry.register(NotionSearchWithUserTool::new(users.clone()));
    registry.register(NotionPageContentWithUserTool::new(users).with_default_depth(default_depth));
    registry.register(GetUserInfoTool::new(backend.clone()));
    registry.register(SaveNotionPageTool::new(backend));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_standard_registry() {
        let backend = BackendClient::new("http://localhost:8080", Duration::from_secs(5)).unwrap();
        let cache = Arc::new(ClientCache::with_factory(|_| {
            Ok(Arc::new(folio_notion::MockSource::new()) as SharedSource)
        }));
        let registry = standard_registry(None, backend, cache, 10);

        assert_eq!(
            registry.names(),
            vec![
                "get_user_info",
                "notion_append_paragraph",
                "notion_page_content",
                "notion_page_content_with_user",
                "notion_search",
                "notion_search_with_user",
                "save_notion_page",
            ]
        );
        let user_scoped: Vec<_> = registry
            .names()
            .into_iter()
            .filter(|n| registry.get(n).is_some_and(|t| t.requires_caller()))
            .collect();
        assert_eq!(user_scoped.len(), 4);
    }
}

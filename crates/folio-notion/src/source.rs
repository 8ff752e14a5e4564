//! The content source abstraction.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{ChildPage, ContentNode, PageMeta, SearchHit};

/// A service hosting a hierarchical document tree.
///
/// Implementations are stateless from the caller's point of view: every
/// call is an independent request and may run concurrently with others.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Retrieve page metadata (used for the title).
    async fn retrieve(&self, id: &str) -> Result<PageMeta>;

    /// List one page of a block's direct children.
    async fn list_children(
        &self,
        id: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<ChildPage>;

    /// Full-text search over pages and databases.
    async fn search(&self, query: &str, page_size: u32) -> Result<Vec<SearchHit>>;

    /// Append `node` as the last child of `id`, returning the new block id.
    async fn append_child(&self, id: &str, node: &ContentNode) -> Result<Option<String>>;
}

/// A content source that can be shared across tasks.
pub type SharedSource = Arc<dyn ContentSource>;

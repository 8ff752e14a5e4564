//! Notion content source for Folio.
//!
//! Turns a paginated, arbitrarily nested block tree into one linear text
//! artifact:
//!
//! ```text
//! ContentSource (NotionClient | MockSource)
//!        │  list_children(id, cursor, page_size)
//!        ▼
//! retriever::fetch(root, max_depth) ──► Vec<ContentNode>
//!        │
//!        ▼
//! render::render_document(nodes, mode) ──► String
//! ```
//!
//! [`ClientCache`] hands out one client per access token so concurrent
//! requests for the same user share a connection pool.

pub mod cache;
pub mod client;
pub mod error;
pub mod render;
pub mod retriever;
pub mod source;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod mock;

pub use cache::ClientCache;
pub use client::{NotionClient, NotionConfig};
pub use error::{NotionError, Result};
pub use render::{RenderMode, reduce, render, render_document};
pub use retriever::{MAX_PAGES_PER_LEVEL, PAGE_SIZE, fetch};
pub use source::{ContentSource, SharedSource};
pub use types::{
    BlockKind, ChildPage, ContentNode, PageMeta, SearchHit, extract_title, rich_text_to_plain,
};

#[cfg(any(test, feature = "testing"))]
pub use mock::MockSource;

//! In-memory content source for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use crate::error::{NotionError, Result};
use crate::source::ContentSource;
use crate::types::{ChildPage, ContentNode, PageMeta, SearchHit};

/// A scripted [`ContentSource`].
///
/// Children are served in pages of `page_size` (or the caller's page size),
/// with cursors of the form `"<offset>"`. Ids marked failing return a 502
/// on every call. Every listing and append is recorded.
#[derive(Debug, Default)]
pub struct MockSource {
    children: HashMap<String, Vec<ContentNode>>,
    pages: HashMap<String, PageMeta>,
    hits: Vec<SearchHit>,
    failing: HashSet<String>,
    page_size: Option<usize>,
    dangling_has_more: bool,
    listed: Mutex<Vec<String>>,
    appended: Mutex<Vec<(String, ContentNode)>>,
    searches: Mutex<Vec<(String, u32)>>,
}

impl MockSource {
    /// An empty source: every id has no children and every page is untitled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the direct children of `id`.
    pub fn with_children(mut self, id: impl Into<String>, children: Vec<ContentNode>) -> Self {
        self.children.insert(id.into(), children);
        self
    }

    /// Set the metadata returned for page `id`.
    pub fn with_page(mut self, id: impl Into<String>, title: impl Into<String>) -> Self {
        let id = id.into();
        self.pages.insert(
            id.clone(),
            PageMeta {
                url: Some(format!("https://www.notion.so/{}", id)),
                id,
                object: "page".to_string(),
                title: title.into(),
            },
        );
        self
    }

    /// Set the results returned by every search.
    pub fn with_search_hits(mut self, hits: Vec<SearchHit>) -> Self {
        self.hits = hits;
        self
    }

    /// Make every call touching `id` fail.
    pub fn failing(mut self, id: impl Into<String>) -> Self {
        self.failing.insert(id.into());
        self
    }

    /// Serve listings in pages of `size`, ignoring the requested size.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size.max(1));
        self
    }

    /// Report `has_more` on the last page but omit the cursor.
    pub fn with_dangling_has_more(mut self) -> Self {
        self.dangling_has_more = true;
        self
    }

    /// Ids passed to `list_children`, in call order.
    pub fn listed_ids(&self) -> Vec<String> {
        self.listed.lock().clone()
    }

    /// `(parent id, node)` pairs passed to `append_child`.
    pub fn appended(&self) -> Vec<(String, ContentNode)> {
        self.appended.lock().clone()
    }

    /// `(query, page size)` pairs passed to `search`.
    pub fn searches(&self) -> Vec<(String, u32)> {
        self.searches.lock().clone()
    }

    fn check(&self, id: &str) -> Result<()> {
        if self.failing.contains(id) {
            return Err(NotionError::Status {
                status: 502,
                code: "bad_gateway".to_string(),
                message: format!("scripted failure for {}", id),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContentSource for MockSource {
    async fn retrieve(&self, id: &str) -> Result<PageMeta> {
        self.check(id)?;
        self.pages
            .get(id)
            .cloned()
            .ok_or_else(|| NotionError::Status {
                status: 404,
                code: "object_not_found".to_string(),
                message: format!("Could not find page with ID: {}", id),
            })
    }

    async fn list_children(
        &self,
        id: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<ChildPage> {
        self.listed.lock().push(id.to_string());
        self.check(id)?;

        let all = self.children.get(id).map(Vec::as_slice).unwrap_or_default();
        let size = self.page_size.unwrap_or(page_size.max(1) as usize);
        let start = match cursor {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| NotionError::Decode(format!("bad cursor {}", c)))?,
            None => 0,
        };
        let end = (start + size).min(all.len());
        let has_more = end < all.len();

        Ok(ChildPage {
            items: all.get(start..end).unwrap_or_default().to_vec(),
            has_more: has_more || self.dangling_has_more,
            next_cursor: has_more.then(|| end.to_string()),
        })
    }

    async fn search(&self, query: &str, page_size: u32) -> Result<Vec<SearchHit>> {
        self.searches.lock().push((query.to_string(), page_size));
        Ok(self
            .hits
            .iter()
            .take(page_size as usize)
            .cloned()
            .collect())
    }

    async fn append_child(&self, id: &str, node: &ContentNode) -> Result<Option<String>> {
        self.check(id)?;
        let mut appended = self.appended.lock();
        appended.push((id.to_string(), node.clone()));
        Ok(Some(format!("appended-{}", appended.len())))
    }
}

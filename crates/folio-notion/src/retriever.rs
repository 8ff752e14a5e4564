//! Depth-bounded recursive retrieval of a block tree.
//!
//! Each level is paginated to completion before descending. Descent stops at
//! `max_depth`, and a failure while expanding one child only empties that
//! child's subtree; the listing of the root itself is the only fatal call.

use futures::future::BoxFuture;

use crate::error::Result;
use crate::source::ContentSource;
use crate::types::ContentNode;

/// Children requested per listing call.
pub const PAGE_SIZE: u32 = 100;

/// Safety bound on listing calls for a single parent.
pub const MAX_PAGES_PER_LEVEL: usize = 10_000;

/// Fetch the children of `root_id`, expanding nested children up to `max_depth` levels.
///
/// With `max_depth == 0` only the direct children are returned, each with an
/// empty `children` list regardless of `has_children`.
pub async fn fetch(
    source: &dyn ContentSource,
    root_id: &str,
    max_depth: u32,
) -> Result<Vec<ContentNode>> {
    let mut lineage = vec![root_id.to_string()];
    fetch_level(source, root_id, max_depth, &mut lineage).await
}

fn fetch_level<'a>(
    source: &'a dyn ContentSource,
    id: &'a str,
    max_depth: u32,
    lineage: &'a mut Vec<String>,
) -> BoxFuture<'a, Result<Vec<ContentNode>>> {
    Box::pin(async move {
        let mut items = list_all(source, id).await?;
        if max_depth == 0 {
            return Ok(items);
        }

        for node in items.iter_mut().filter(|n| n.has_children) {
            if lineage.contains(&node.id) {
                tracing::warn!(block_id = %node.id, "Block reappears in its own ancestry, not descending");
                continue;
            }

            let child_id = node.id.clone();
            lineage.push(child_id.clone());
            let result = fetch_level(source, &child_id, max_depth - 1, lineage).await;
            lineage.pop();

            node.children = result.unwrap_or_else(|e| {
                tracing::warn!(block_id = %child_id, error = %e, "Failed to fetch child blocks, leaving branch empty");
                Vec::new()
            });
        }

        Ok(items)
    })
}

/// Collect every page of `id`'s direct children.
async fn list_all(source: &dyn ContentSource, id: &str) -> Result<Vec<ContentNode>> {
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;

    for _ in 0..MAX_PAGES_PER_LEVEL {
        let page = source
            .list_children(id, cursor.as_deref(), PAGE_SIZE)
            .await?;
        items.extend(page.items);

        if !page.has_more {
            return Ok(items);
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => {
                tracing::warn!(block_id = %id, "Listing reported more pages without a cursor, stopping");
                return Ok(items);
            }
        }
    }

    tracing::warn!(
        block_id = %id,
        max_pages = MAX_PAGES_PER_LEVEL,
        items = items.len(),
        "Page limit reached while listing children, result truncated"
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSource;
    use crate::types::BlockKind;

    fn para(id: &str) -> ContentNode {
        ContentNode::new(id, BlockKind::Paragraph, id)
    }

    /// root -> a -> a1 -> a11, plus root -> b
    fn deep_source() -> MockSource {
        MockSource::new()
            .with_children("root", vec![para("a").with_has_children(), para("b")])
            .with_children("a", vec![para("a1").with_has_children()])
            .with_children("a1", vec![para("a11")])
    }

    #[tokio::test]
    async fn test_fetch_full_depth() {
        let source = deep_source();
        let nodes = fetch(&source, "root", 10).await.unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].children[0].id, "a1");
        assert_eq!(nodes[0].children[0].children[0].id, "a11");
        assert!(nodes[1].children.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_depth_zero_does_not_descend() {
        let source = deep_source();
        let nodes = fetch(&source, "root", 0).await.unwrap();

        assert!(nodes[0].has_children);
        assert!(nodes[0].children.is_empty());
        assert_eq!(source.listed_ids(), vec!["root"]);
    }

    #[tokio::test]
    async fn test_fetch_depth_one_stops_at_second_level() {
        let source = deep_source();
        let nodes = fetch(&source, "root", 1).await.unwrap();

        let a1 = &nodes[0].children[0];
        assert_eq!(a1.id, "a1");
        assert!(a1.has_children);
        assert!(a1.children.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_follows_every_page() {
        let children: Vec<ContentNode> = (0..250).map(|i| para(&format!("n{}", i))).collect();
        let source = MockSource::new()
            .with_page_size(100)
            .with_children("root", children);

        let nodes = fetch(&source, "root", 10).await.unwrap();

        assert_eq!(nodes.len(), 250);
        assert_eq!(nodes[249].id, "n249");
        assert_eq!(source.listed_ids(), vec!["root", "root", "root"]);
    }

    #[tokio::test]
    async fn test_failing_branch_is_isolated() {
        let source = MockSource::new()
            .with_children("root", vec![para("ok").with_has_children(), para("bad").with_has_children()])
            .with_children("ok", vec![para("ok1")])
            .failing("bad");

        let nodes = fetch(&source, "root", 10).await.unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].children.len(), 1);
        assert_eq!(nodes[1].id, "bad");
        assert!(nodes[1].children.is_empty());
    }

    #[tokio::test]
    async fn test_root_failure_propagates() {
        let source = MockSource::new().failing("root");
        assert!(fetch(&source, "root", 10).await.is_err());
    }

    #[tokio::test]
    async fn test_cycle_is_not_followed() {
        let source = MockSource::new()
            .with_children("root", vec![para("a").with_has_children()])
            .with_children("a", vec![para("root").with_has_children()]);

        let nodes = fetch(&source, "root", 10).await.unwrap();

        let back_edge = &nodes[0].children[0];
        assert_eq!(back_edge.id, "root");
        assert!(back_edge.children.is_empty());
        assert_eq!(source.listed_ids(), vec!["root", "a"]);
    }

    #[tokio::test]
    async fn test_missing_cursor_stops_pagination() {
        let source = MockSource::new()
            .with_children("root", vec![para("x")])
            .with_dangling_has_more();

        let nodes = fetch(&source, "root", 10).await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(source.listed_ids().len(), 1);
    }
}

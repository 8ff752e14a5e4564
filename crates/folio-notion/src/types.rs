//! Content tree model and decoding from Notion's JSON shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

// ─────────────────────────────────────────────────────────────────────────────
// Block Kinds
// ─────────────────────────────────────────────────────────────────────────────

/// Type tag of a block, with its type-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    Paragraph,
    BulletedListItem,
    NumberedListItem,
    ToDo { checked: bool },
    Quote,
    Callout { icon: Option<String> },
    Code { language: String },
    Toggle,
    Divider,
    Image { caption: String },
    /// Any block type without a dedicated rendering; keeps the raw tag.
    Other { tag: String },
}

impl BlockKind {
    /// Decode the kind from a block's type tag and its payload object.
    fn from_tag(tag: &str, data: &Value) -> Self {
        match tag {
            "heading_1" => Self::Heading1,
            "heading_2" => Self::Heading2,
            "heading_3" => Self::Heading3,
            "paragraph" => Self::Paragraph,
            "bulleted_list_item" => Self::BulletedListItem,
            "numbered_list_item" => Self::NumberedListItem,
            "to_do" => Self::ToDo {
                checked: data.get("checked").and_then(Value::as_bool).unwrap_or(false),
            },
            "quote" => Self::Quote,
            "callout" => Self::Callout {
                icon: data
                    .get("icon")
                    .and_then(|icon| icon.get("emoji"))
                    .and_then(Value::as_str)
                    .filter(|emoji| !emoji.is_empty())
                    .map(str::to_string),
            },
            "code" => Self::Code {
                language: data
                    .get("language")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            "toggle" => Self::Toggle,
            "divider" => Self::Divider,
            "image" => Self::Image {
                caption: rich_text_to_plain(data.get("caption")),
            },
            other => Self::Other {
                tag: other.to_string(),
            },
        }
    }

    /// The Notion type tag for this kind.
    pub fn tag(&self) -> &str {
        match self {
            Self::Heading1 => "heading_1",
            Self::Heading2 => "heading_2",
            Self::Heading3 => "heading_3",
            Self::Paragraph => "paragraph",
            Self::BulletedListItem => "bulleted_list_item",
            Self::NumberedListItem => "numbered_list_item",
            Self::ToDo { .. } => "to_do",
            Self::Quote => "quote",
            Self::Callout { .. } => "callout",
            Self::Code { .. } => "code",
            Self::Toggle => "toggle",
            Self::Divider => "divider",
            Self::Image { .. } => "image",
            Self::Other { tag } => tag,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Content Node
// ─────────────────────────────────────────────────────────────────────────────

/// One block of a document tree.
///
/// `children` is only populated by retrieval; a node past the depth limit
/// keeps `has_children == true` with an empty `children`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: String,
    pub kind: BlockKind,
    /// Inline text flattened from the block's rich-text spans.
    pub text: String,
    pub has_children: bool,
    #[serde(default)]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    /// Create a childless node.
    pub fn new(id: impl Into<String>, kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            text: text.into(),
            has_children: false,
            children: Vec::new(),
        }
    }

    /// A paragraph node with no id yet, for appending.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new("", BlockKind::Paragraph, text)
    }

    /// Mark the node as having (unfetched) children.
    pub fn with_has_children(mut self) -> Self {
        self.has_children = true;
        self
    }

    /// Attach already-built children.
    pub fn with_children(mut self, children: Vec<ContentNode>) -> Self {
        self.has_children = !children.is_empty() || self.has_children;
        self.children = children;
        self
    }

    /// Decode a block object as returned by the blocks API.
    ///
    /// Missing fields degrade to empty values; a block without a type tag
    /// becomes `Other { tag: "unknown" }`.
    pub fn from_block(block: &Value) -> Self {
        let tag = block
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let data = block.get(tag).cloned().unwrap_or(Value::Null);

        Self {
            id: block
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            kind: BlockKind::from_tag(tag, &data),
            text: rich_text_to_plain(data.get("rich_text")),
            has_children: block
                .get("has_children")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            children: Vec::new(),
        }
    }

    /// Encode as a block object for the append API.
    pub fn to_block(&self) -> Value {
        let tag = self.kind.tag();
        let rich_text = json!([{"type": "text", "text": {"content": self.text}}]);
        let payload = match &self.kind {
            BlockKind::Divider => json!({}),
            BlockKind::ToDo { checked } => json!({"rich_text": rich_text, "checked": checked}),
            BlockKind::Code { language } => json!({"rich_text": rich_text, "language": language}),
            BlockKind::Callout { icon } => match icon {
                Some(emoji) => json!({
                    "rich_text": rich_text,
                    "icon": {"type": "emoji", "emoji": emoji}
                }),
                None => json!({"rich_text": rich_text}),
            },
            _ => json!({"rich_text": rich_text}),
        };

        let mut block = serde_json::Map::new();
        block.insert("object".to_string(), json!("block"));
        block.insert("type".to_string(), json!(tag));
        block.insert(tag.to_string(), payload);
        Value::Object(block)
    }

    /// Number of nodes in this subtree, the node itself included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ContentNode::count).sum::<usize>()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing, Search and Page Metadata
// ─────────────────────────────────────────────────────────────────────────────

/// One page of a child listing.
#[derive(Debug, Clone, Default)]
pub struct ChildPage {
    pub items: Vec<ContentNode>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

impl ChildPage {
    /// Decode a `list block children` response body.
    pub fn from_response(body: &Value) -> Self {
        Self {
            items: body
                .get("results")
                .and_then(Value::as_array)
                .map(|results| results.iter().map(ContentNode::from_block).collect())
                .unwrap_or_default(),
            has_more: body
                .get("has_more")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            next_cursor: body
                .get("next_cursor")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// A search result: a page or database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub url: Option<String>,
    pub title: String,
}

impl SearchHit {
    /// Decode one entry of a search response.
    pub fn from_object(obj: &Value) -> Self {
        Self {
            id: str_field(obj, "id"),
            object_type: str_field(obj, "object"),
            url: obj.get("url").and_then(Value::as_str).map(str::to_string),
            title: extract_title(obj),
        }
    }
}

/// Metadata of a retrieved page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub id: String,
    pub object: String,
    pub url: Option<String>,
    pub title: String,
}

impl PageMeta {
    /// Decode a `retrieve page` response body.
    pub fn from_object(obj: &Value) -> Self {
        Self {
            id: str_field(obj, "id"),
            object: str_field(obj, "object"),
            url: obj.get("url").and_then(Value::as_str).map(str::to_string),
            title: extract_title(obj),
        }
    }
}

fn str_field(obj: &Value, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Rich Text and Titles
// ─────────────────────────────────────────────────────────────────────────────

/// Flatten a rich-text span list to plain text.
///
/// Each span contributes its `plain_text`, else its `text.content`; the
/// joined result is trimmed. Anything that is not an array yields `""`.
pub fn rich_text_to_plain(spans: Option<&Value>) -> String {
    let Some(spans) = spans.and_then(Value::as_array) else {
        return String::new();
    };

    let joined: String = spans
        .iter()
        .filter(|span| span.is_object())
        .map(|span| {
            span.get("plain_text")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .or_else(|| {
                    span.get("text")
                        .and_then(|t| t.get("content"))
                        .and_then(Value::as_str)
                })
                .unwrap_or_default()
        })
        .collect();

    joined.trim().to_string()
}

/// Extract a display title from a page or database object.
///
/// Pages use their first `title`-typed property, falling back to the
/// property's name when its text is empty. Databases use their `title`
/// rich text. Anything else has no title.
pub fn extract_title(obj: &Value) -> String {
    match obj.get("object").and_then(Value::as_str) {
        Some("page") => obj
            .get("properties")
            .and_then(Value::as_object)
            .and_then(|props| {
                props.iter().find_map(|(name, prop)| {
                    (prop.get("type").and_then(Value::as_str) == Some("title")).then(|| {
                        let text = rich_text_to_plain(prop.get("title"));
                        if text.is_empty() { name.clone() } else { text }
                    })
                })
            })
            .unwrap_or_default(),
        Some("database") => rich_text_to_plain(obj.get("title")),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rich_text_to_plain() {
        let spans = json!([
            {"plain_text": "Hello, "},
            {"text": {"content": "world"}},
            "not a span",
            {"plain_text": "!  "}
        ]);
        assert_eq!(rich_text_to_plain(Some(&spans)), "Hello, world!");
        assert_eq!(rich_text_to_plain(Some(&json!([]))), "");
        assert_eq!(rich_text_to_plain(Some(&json!("text"))), "");
        assert_eq!(rich_text_to_plain(None), "");
    }

    #[test]
    fn test_from_block_paragraph() {
        let block = json!({
            "object": "block",
            "id": "b1",
            "type": "paragraph",
            "has_children": true,
            "paragraph": {"rich_text": [{"plain_text": "hello"}]}
        });
        let node = ContentNode::from_block(&block);
        assert_eq!(node.id, "b1");
        assert_eq!(node.kind, BlockKind::Paragraph);
        assert_eq!(node.text, "hello");
        assert!(node.has_children);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_from_block_payloads() {
        let todo = ContentNode::from_block(&json!({
            "id": "t", "type": "to_do",
            "to_do": {"rich_text": [{"plain_text": "ship"}], "checked": true}
        }));
        assert_eq!(todo.kind, BlockKind::ToDo { checked: true });

        let callout = ContentNode::from_block(&json!({
            "id": "c", "type": "callout",
            "callout": {"rich_text": [], "icon": {"type": "emoji", "emoji": "🔥"}}
        }));
        assert_eq!(
            callout.kind,
            BlockKind::Callout {
                icon: Some("🔥".to_string())
            }
        );

        let external_icon = ContentNode::from_block(&json!({
            "id": "c2", "type": "callout",
            "callout": {"rich_text": [], "icon": {"type": "external", "external": {"url": "x"}}}
        }));
        assert_eq!(external_icon.kind, BlockKind::Callout { icon: None });

        let code = ContentNode::from_block(&json!({
            "id": "k", "type": "code",
            "code": {"rich_text": [{"plain_text": "fn main() {}"}], "language": "rust"}
        }));
        assert_eq!(
            code.kind,
            BlockKind::Code {
                language: "rust".to_string()
            }
        );
        assert_eq!(code.text, "fn main() {}");

        let image = ContentNode::from_block(&json!({
            "id": "i", "type": "image",
            "image": {"caption": [{"plain_text": "diagram"}]}
        }));
        assert_eq!(
            image.kind,
            BlockKind::Image {
                caption: "diagram".to_string()
            }
        );
    }

    #[test]
    fn test_from_block_unknown_type() {
        let node = ContentNode::from_block(&json!({
            "id": "x", "type": "table_of_contents", "table_of_contents": {}
        }));
        assert_eq!(
            node.kind,
            BlockKind::Other {
                tag: "table_of_contents".to_string()
            }
        );

        let untyped = ContentNode::from_block(&json!({"id": "y"}));
        assert_eq!(untyped.kind.tag(), "unknown");
    }

    #[test]
    fn test_to_block_paragraph() {
        let block = ContentNode::paragraph("note").to_block();
        assert_eq!(block["type"], "paragraph");
        assert_eq!(block["paragraph"]["rich_text"][0]["text"]["content"], "note");
    }

    #[test]
    fn test_extract_title_page() {
        let page = json!({
            "object": "page",
            "properties": {
                "Tags": {"type": "multi_select"},
                "Name": {"type": "title", "title": [{"plain_text": "Roadmap"}]}
            }
        });
        assert_eq!(extract_title(&page), "Roadmap");

        let untitled = json!({
            "object": "page",
            "properties": {"Name": {"type": "title", "title": []}}
        });
        assert_eq!(extract_title(&untitled), "Name");

        let no_title = json!({"object": "page", "properties": {}});
        assert_eq!(extract_title(&no_title), "");
    }

    #[test]
    fn test_extract_title_database_and_other() {
        let db = json!({"object": "database", "title": [{"plain_text": "Tasks"}]});
        assert_eq!(extract_title(&db), "Tasks");
        assert_eq!(extract_title(&json!({"object": "block"})), "");
    }

    #[test]
    fn test_child_page_from_response() {
        let body = json!({
            "results": [{"id": "a", "type": "divider", "divider": {}}],
            "has_more": true,
            "next_cursor": "cur-2"
        });
        let page = ChildPage::from_response(&body);
        assert_eq!(page.items.len(), 1);
        assert!(page.has_more);
        assert_eq!(page.next_cursor.as_deref(), Some("cur-2"));
    }

    #[test]
    fn test_search_hit_serializes_type_field() {
        let hit = SearchHit::from_object(&json!({
            "id": "p1",
            "object": "page",
            "url": "https://notion.so/p1",
            "properties": {"title": {"type": "title", "title": [{"plain_text": "Notes"}]}}
        }));
        let value = serde_json::to_value(&hit).unwrap();
        assert_eq!(value["type"], "page");
        assert_eq!(value["title"], "Notes");
    }

    #[test]
    fn test_count() {
        let tree = ContentNode::new("r", BlockKind::Toggle, "t").with_children(vec![
            ContentNode::new("a", BlockKind::Paragraph, "a"),
            ContentNode::new("b", BlockKind::Paragraph, "b")
                .with_children(vec![ContentNode::new("c", BlockKind::Paragraph, "c")]),
        ]);
        assert_eq!(tree.count(), 4);
    }
}

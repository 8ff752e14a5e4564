//! Flattening a block tree into indented markdown-like text.

use serde::{Deserialize, Serialize};

use crate::types::{BlockKind, ContentNode};

/// Icon used for callouts without an emoji.
const DEFAULT_CALLOUT_ICON: &str = "💡";

/// Marker substrings removed by [`reduce`], in removal order. `"# "` goes
/// first, so `"## "` leaves a bare `"#"` behind.
const REDUCED_MARKERS: [&str; 5] = ["# ", "## ", "### ", "- [x] ", "- [ ] "];

/// Output mode of [`render_document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Markdown-like structure: headings, bullets, fences.
    #[default]
    Structured,
    /// Structured output with heading and checklist markers stripped.
    Reduced,
}

impl RenderMode {
    /// Parse a user-supplied format name. `"plain"` (any case) selects
    /// [`RenderMode::Reduced`]; everything else is structured.
    pub fn from_format(format: &str) -> Self {
        if format.trim().eq_ignore_ascii_case("plain") {
            Self::Reduced
        } else {
            Self::Structured
        }
    }

    /// The name reported back to callers.
    pub fn format_name(&self) -> &'static str {
        match self {
            Self::Structured => "markdown",
            Self::Reduced => "plain",
        }
    }
}

/// Render `nodes` in pre-order, one or more lines per node.
///
/// Lines are indented by two spaces per `depth`. A node's children follow
/// its own lines directly, one level deeper.
pub fn render(nodes: &[ContentNode], depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    render_into(nodes, depth, &mut lines);
    lines
}

fn render_into(nodes: &[ContentNode], depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);

    for node in nodes {
        let text = &node.text;
        match &node.kind {
            BlockKind::Heading1 => lines.push(format!("{indent}# {text}")),
            BlockKind::Heading2 => lines.push(format!("{indent}## {text}")),
            BlockKind::Heading3 => lines.push(format!("{indent}### {text}")),
            BlockKind::Paragraph => lines.push(format!("{indent}{text}")),
            BlockKind::BulletedListItem => lines.push(format!("{indent}- {text}")),
            BlockKind::NumberedListItem => lines.push(format!("{indent}1. {text}")),
            BlockKind::ToDo { checked } => {
                let mark = if *checked { 'x' } else { ' ' };
                lines.push(format!("{indent}- [{mark}] {text}"));
            }
            BlockKind::Quote => lines.push(format!("{indent}> {text}")),
            BlockKind::Callout { icon } => {
                let icon = icon.as_deref().unwrap_or(DEFAULT_CALLOUT_ICON);
                lines.push(format!("{indent}{icon} {text}"));
            }
            BlockKind::Code { language } => {
                lines.push(format!("{indent}```{language}").trim_end().to_string());
                // Code body is emitted verbatim, without indentation
                lines.push(text.clone());
                lines.push(format!("{indent}```"));
            }
            BlockKind::Toggle => lines.push(format!("{indent}▸ {text}")),
            BlockKind::Divider => lines.push(format!("{indent}---")),
            BlockKind::Image { caption } => {
                lines.push(format!("{indent}![image]  {caption}").trim_end().to_string());
            }
            BlockKind::Other { tag } => {
                lines.push(format!("{indent}[{tag}] {text}").trim_end().to_string());
            }
        }

        if !node.children.is_empty() {
            render_into(&node.children, depth + 1, lines);
        }
    }
}

/// Render a whole document: lines joined by newlines, trimmed, then reduced
/// when `mode` asks for it.
pub fn render_document(nodes: &[ContentNode], mode: RenderMode) -> String {
    let joined = render(nodes, 0).join("\n");
    let text = joined.trim();
    match mode {
        RenderMode::Structured => text.to_string(),
        RenderMode::Reduced => reduce(text),
    }
}

/// Strip heading and checklist markers from rendered text.
///
/// This is a literal substring edit over the whole text, not a re-render:
/// the markers are removed wherever they occur, including inside body text
/// (`"C# basics"` becomes `"Cbasics"`). Removing `"# "` first turns
/// `"## Plan"` into `"#Plan"`.
pub fn reduce(text: &str) -> String {
    REDUCED_MARKERS
        .iter()
        .fold(text.to_string(), |acc, marker| acc.replace(marker, ""))
}

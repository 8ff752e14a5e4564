//! Conversion of tool registry entries into function-call schemas.

use folio_llm::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A record that can be reduced to a key-value mapping.
pub trait Exportable {
    /// The record's fields as a JSON object.
    fn export_fields(&self) -> Map<String, Value>;
}

impl Exportable for Map<String, Value> {
    fn export_fields(&self) -> Map<String, Value> {
        self.clone()
    }
}

/// Non-object values export no fields.
impl Exportable for Value {
    fn export_fields(&self) -> Map<String, Value> {
        self.as_object().cloned().unwrap_or_default()
    }
}

/// Name used when a registry entry carries none.
pub const FALLBACK_TOOL_NAME: &str = "tool";

/// A tool as listed in a registry snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Create a new descriptor.
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

impl Exportable for ToolDescriptor {
    fn export_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(self.name.clone()));
        fields.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        fields.insert("inputSchema".to_string(), self.input_schema.clone());
        fields
    }
}

/// The schema used when an entry declares no usable parameters.
pub fn empty_object_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

/// First non-empty string among `keys`.
fn first_str<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

/// Convert a registry entry into the schema sent with every completion request.
///
/// The name is read from `name`, then `tool`, defaulting to `"tool"`. The
/// parameter schema is read from `inputSchema`, then `input_schema`; a
/// missing, empty or non-object schema becomes an empty object schema, and an
/// object schema without a `type` gets `"type": "object"`.
pub fn adapt(entry: &impl Exportable) -> ToolDefinition {
    let fields = entry.export_fields();

    let name = first_str(&fields, &["name", "tool"]).unwrap_or(FALLBACK_TOOL_NAME);
    let description = fields
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let parameters = ["inputSchema", "input_schema"]
        .iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_object))
        .find(|schema| !schema.is_empty())
        .map(|schema| {
            let mut schema = schema.clone();
            schema
                .entry("type")
                .or_insert_with(|| Value::String("object".to_string()));
            Value::Object(schema)
        })
        .unwrap_or_else(empty_object_schema);

    ToolDefinition::new(name, description, parameters)
}

/// Adapt every entry, preserving order.
pub fn adapt_all<'a, E: Exportable + 'a>(entries: impl IntoIterator<Item = &'a E>) -> Vec<ToolDefinition> {
    entries.into_iter().map(|entry| adapt(entry)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapt_descriptor() {
        let descriptor = ToolDescriptor::new(
            "notion_search",
            "Search pages",
            json!({"type": "object", "properties": {"query": {"type": "string"}}, "required": ["query"]}),
        );
        let def = adapt(&descriptor);

        assert_eq!(def.name, "notion_search");
        assert_eq!(def.description, "Search pages");
        assert_eq!(def.parameters["required"][0], "query");
    }

    #[test]
    fn test_name_fallbacks() {
        assert_eq!(adapt(&json!({"tool": "legacy"})).name, "legacy");
        assert_eq!(adapt(&json!({"name": "", "tool": "legacy"})).name, "legacy");
        assert_eq!(adapt(&json!({})).name, FALLBACK_TOOL_NAME);
        assert_eq!(adapt(&json!(42)).name, FALLBACK_TOOL_NAME);
    }

    #[test]
    fn test_schema_field_alternatives() {
        let snake = adapt(&json!({"name": "a", "input_schema": {"type": "object", "properties": {"x": {}}}}));
        assert!(snake.parameters["properties"].get("x").is_some());

        let camel_wins = adapt(&json!({
            "name": "a",
            "inputSchema": {"type": "object", "properties": {"camel": {}}},
            "input_schema": {"type": "object", "properties": {"snake": {}}},
        }));
        assert!(camel_wins.parameters["properties"].get("camel").is_some());

        let empty_falls_through = adapt(&json!({
            "name": "a",
            "inputSchema": {},
            "input_schema": {"type": "object", "properties": {"snake": {}}},
        }));
        assert!(empty_falls_through.parameters["properties"].get("snake").is_some());
    }

    #[test]
    fn test_parameters_always_object_schema() {
        for entry in [
            json!({"name": "a"}),
            json!({"name": "a", "inputSchema": null}),
            json!({"name": "a", "inputSchema": "string"}),
            json!({"name": "a", "inputSchema": {"properties": {}}}),
        ] {
            let def = adapt(&entry);
            assert_eq!(def.parameters["type"], "object", "entry: {entry}");
        }
        assert_eq!(adapt(&json!({"name": "a"})).parameters, empty_object_schema());
    }

    #[test]
    fn test_adapt_keeps_text_verbatim() {
        let def = adapt(&json!({
            "name": "search",
            "description": r"Matches \uD800 literally",
            "inputSchema": {"type": "object", "properties": {"q": {"description": "💡 query"}}},
        }));
        assert_eq!(def.description, r"Matches \uD800 literally");
        assert_eq!(def.parameters["properties"]["q"]["description"], "💡 query");
    }

    #[test]
    fn test_export_fields() {
        let map = json!({"name": "x"}).export_fields();
        assert_eq!(map["name"], "x");
        assert!(json!("not a record").export_fields().is_empty());
        let descriptor = ToolDescriptor::new("a", "b", json!({}));
        assert_eq!(descriptor.export_fields()["inputSchema"], json!({}));
    }

    #[test]
    fn test_adapt_is_idempotent() {
        let descriptor = ToolDescriptor::new("a", "b", json!({"type": "object", "properties": {}}));
        let once = adapt(&descriptor);
        let again = adapt(&ToolDescriptor::new(
            once.name.clone(),
            once.description.clone(),
            once.parameters.clone(),
        ));
        assert_eq!(once, again);
    }

    #[test]
    fn test_adapt_all_one_schema_per_entry() {
        let entries = vec![
            ToolDescriptor::new("a", "", Value::Null),
            ToolDescriptor::new("b", "", Value::Null),
            ToolDescriptor::new("", "", Value::Null),
        ];
        let defs = adapt_all(&entries);
        assert_eq!(defs.len(), 3);
        assert!(defs.iter().all(|d| !d.name.is_empty()));
    }
}

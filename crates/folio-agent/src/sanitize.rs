//! Surrogate cleanup for text the agent decodes a second time.
//!
//! Decoded text (`String`, `serde_json::Value`) cannot hold a surrogate code
//! point, and every document received over the network is cleaned while it
//! is decoded (see [`folio_types::from_json_str`]). A tool call's argument
//! payload is the exception: it stays raw JSON text after the completion
//! reply is decoded and is parsed again by the executor. [`Sanitize`]
//! cleans those payloads and leaves all other text untouched.

pub use folio_types::strip_surrogates;

use folio_llm::{Message, ToolCallRequest};

/// A value whose raw JSON payloads can be cleaned before they are decoded.
pub trait Sanitize {
    /// Return the value with unpaired surrogate escapes removed from every
    /// raw JSON payload it carries.
    fn sanitize(self) -> Self;
}

impl<T: Sanitize> Sanitize for Vec<T> {
    fn sanitize(self) -> Self {
        self.into_iter().map(Sanitize::sanitize).collect()
    }
}

impl Sanitize for ToolCallRequest {
    fn sanitize(self) -> Self {
        let cleaned = match strip_surrogates(&self.arguments) {
            std::borrow::Cow::Owned(clean) => Some(clean),
            std::borrow::Cow::Borrowed(_) => None,
        };
        Self {
            arguments: cleaned.unwrap_or(self.arguments),
            ..self
        }
    }
}

impl Sanitize for Message {
    fn sanitize(self) -> Self {
        Self {
            tool_calls: self.tool_calls.sanitize(),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_payload_cleaned() {
        let msg = Message::assistant_tool_calls(
            Some("t".to_string()),
            vec![ToolCallRequest::new("c1", "search", r#"{"q":"a\uDFFFb"}"#)],
        )
        .sanitize();
        assert_eq!(msg.tool_calls[0].arguments, r#"{"q":"ab"}"#);
        assert_eq!(msg.tool_calls[0].id, "c1");
        assert_eq!(msg.tool_calls[0].name, "search");
    }

    #[test]
    fn test_decoded_text_left_alone() {
        let text = r"What does the JSON escape \uD800 mean?";
        let msg = Message::user(text).sanitize();
        assert_eq!(msg.text(), text);

        let msg = Message::tool_result("c1", "search", text).sanitize();
        assert_eq!(msg.text(), text);
    }

    #[test]
    fn test_clean_payload_unchanged() {
        let call = ToolCallRequest::new("c1", "search", r#"{"q":"😀 \\uD800"}"#);
        assert_eq!(call.clone().sanitize(), call);
    }
}

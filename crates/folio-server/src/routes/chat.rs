//! Chat endpoint for interacting with the agent.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header},
};
use folio_types::from_json_slice;
use serde::{Deserialize, Serialize};

use folio_agent::CallerContext;

use crate::error::ServerError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for the chat endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    #[serde(default)]
    pub message: String,

    /// Id of the calling user, if known.
    #[serde(default, alias = "callerId")]
    pub user_id: Option<String>,

    /// The caller's cookie string. A `Cookie` header wins over this field.
    #[serde(default)]
    pub cookies: Option<String>,
}

/// Response from the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The agent's answer.
    pub response: String,
    pub status: String,
}

impl ChatRequest {
    /// Decode a raw request body. Lone surrogate escapes are dropped rather
    /// than failing the request.
    pub fn from_body(body: &[u8]) -> Result<Self, ServerError> {
        from_json_slice(body)
            .map_err(|e| ServerError::BadRequest(format!("Invalid JSON body: {}", e)))
    }

    /// The caller identity, preferring the request's `Cookie` header.
    pub fn caller(&self, headers: &HeaderMap) -> CallerContext {
        let header_cookies = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty());

        let mut caller = match self.user_id.as_deref() {
            Some(id) => CallerContext::user(id),
            None => CallerContext::anonymous(),
        };
        if let Some(cookies) = header_cookies.or(self.cookies.as_deref()) {
            caller = caller.with_cookies(cookies);
        }
        caller
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/chat - Run one conversation to completion.
pub async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ChatResponse>, ServerError> {
    let request = ChatRequest::from_body(&body)?;
    if request.message.trim().is_empty() {
        return Err(ServerError::BadRequest("Message is required".to_string()));
    }

    let caller = request.caller(&headers);
    tracing::info!(
        user_id = caller.user_id().unwrap_or("-"),
        has_cookies = caller.cookies().is_some(),
        message_len = request.message.len(),
        "Chat request"
    );

    let response = state.agent.turn(&request.message, &caller).await?;

    tracing::info!(
        iterations = response.iterations,
        tool_calls = response.tool_calls.len(),
        truncated = response.truncated,
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        "Chat request complete"
    );

    Ok(Json(ChatResponse {
        response: response.text,
        status: "success".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn request(body: serde_json::Value) -> ChatRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_from_body_drops_lone_surrogates() {
        let body = br#"{"message": "find \ud83d notes", "user_id": "u\udc00-1"}"#;
        let req = ChatRequest::from_body(body).unwrap();
        assert_eq!(req.message, "find  notes");
        assert_eq!(req.user_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn test_from_body_rejects_malformed_json() {
        let err = ChatRequest::from_body(b"{not json").unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }

    #[test]
    fn test_caller_id_alias() {
        let req = request(serde_json::json!({"message": "hi", "callerId": "u-7"}));
        assert_eq!(req.user_id.as_deref(), Some("u-7"));
    }

    #[test]
    fn test_cookie_header_takes_priority() {
        let req = request(serde_json::json!({
            "message": "hi",
            "user_id": "u-1",
            "cookies": "from=body"
        }));
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("from=header"));

        let caller = req.caller(&headers);
        assert_eq!(caller.user_id(), Some("u-1"));
        assert_eq!(caller.cookies(), Some("from=header"));
    }

    #[test]
    fn test_body_cookies_used_without_header() {
        let req = request(serde_json::json!({"message": "hi", "cookies": "from=body"}));
        let caller = req.caller(&HeaderMap::new());
        assert_eq!(caller.user_id(), None);
        assert_eq!(caller.cookies(), Some("from=body"));
    }
}

//! HTTP client for talking to a running Folio server.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Where `folio start` listens by default.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8081";

/// Health check response from the server.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(default)]
    pub tools_count: usize,
}

/// Chat request.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<&'a str>,
}

/// Chat response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// HTTP client for the Folio server.
pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    /// Create a new client for the given server URL.
    pub fn new(base_url: &str) -> Result<Self> {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            anyhow::bail!("Server URL must start with http:// or https://: {}", base_url);
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check server health.
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self.http.get(self.url("/api/health")).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Server returned error: {}", response.status());
        }
        Ok(response.json().await?)
    }

    /// Send one chat message and wait for the answer.
    pub async fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatResponse> {
        let response = self.http.post(self.url("/api/chat")).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            match serde_json::from_str::<ErrorBody>(&body) {
                Ok(error) => anyhow::bail!("{} ({})", error.message, error.code),
                Err(_) => anyhow::bail!("Server returned error: {} {}", status, body.trim()),
            }
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_url() {
        assert!(Client::new("localhost:8081").is_err());
        let client = Client::new("http://localhost:8081/").unwrap();
        assert_eq!(client.url("/api/chat"), "http://localhost:8081/api/chat");
    }

    #[test]
    fn test_chat_request_omits_missing_identity() {
        let request = ChatRequest {
            message: "hi",
            user_id: None,
            cookies: None,
        };
        assert_eq!(serde_json::to_value(&request).unwrap(), serde_json::json!({"message": "hi"}));
    }
}

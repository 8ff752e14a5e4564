//! Error types for the content source.

use thiserror::Error;

/// Result type alias using the content source error type.
pub type Result<T> = std::result::Result<T, NotionError>;

/// Errors from talking to the content source.
#[derive(Debug, Error)]
pub enum NotionError {
    /// Transport failure (connect, timeout, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered with a non-success status.
    #[error("Notion API error ({status}, {code}): {message}")]
    Status {
        status: u16,
        code: String,
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The client cannot be used as configured (missing token, bad URL).
    #[error("Configuration error: {0}")]
    Config(String),
}

impl NotionError {
    /// Returns true for 404 answers.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for NotionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NotionError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            NotionError::Network(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            NotionError::Decode(err.to_string())
        } else {
            NotionError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for NotionError {
    fn from(err: serde_json::Error) -> Self {
        NotionError::Decode(err.to_string())
    }
}

//! Server configuration.

use std::net::SocketAddr;

use folio_config::ServerSection;

use crate::error::{Result, ServerError};

/// Default bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8081";

/// Default max body size for REST requests (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// CORS allowed origins (empty = no CORS).
    /// Credentials are allowed for every listed origin.
    pub cors_origins: Vec<String>,

    /// Maximum REST request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8081)),
            cors_origins: vec!["http://localhost:3000".to_string()],
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl ServerConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[server]` section of the config file.
    pub fn from_section(section: &ServerSection) -> Result<Self> {
        let bind_address = section.bind.parse().map_err(|e| {
            ServerError::Config(format!("invalid bind address '{}': {}", section.bind, e))
        })?;

        Ok(Self {
            bind_address,
            cors_origins: section.cors_origins.clone(),
            max_body_size: section.max_body_size,
        })
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set CORS allowed origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Set the maximum REST request body size.
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_section() {
        let section = ServerSection {
            bind: "127.0.0.1:9000".to_string(),
            cors_origins: vec!["https://app.example".to_string()],
            max_body_size: 2048,
        };
        let config = ServerConfig::from_section(&section).unwrap();
        assert_eq!(config.bind_address.port(), 9000);
        assert_eq!(config.cors_origins, vec!["https://app.example"]);
        assert_eq!(config.max_body_size, 2048);
    }

    #[test]
    fn test_from_section_rejects_bad_bind() {
        let section = ServerSection {
            bind: "localhost".to_string(),
            ..ServerSection::default()
        };
        let err = ServerConfig::from_section(&section).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn test_default_matches_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address.to_string(), DEFAULT_BIND_ADDRESS);
        assert_eq!(config.max_body_size, ServerSection::default().max_body_size);
    }
}

//! Configuration system for the Folio agent.
//!
//! Provides TOML-based configuration with:
//! - Sections for the completion service, content source, backend API,
//!   HTTP server and orchestration loop
//! - Config file layering (XDG user config + project-local overrides)
//! - Environment overrides for credentials and endpoints
//!
//! Every field has a default, so an empty file (or no file) is valid; only
//! credentials are checked, through [`FolioConfig::missing_credentials`].

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_options,
    xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;

//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/folio/config.toml` (XDG user config)
//! 2. `./folio.toml` (project-local)
//! 3. An explicit `--config` file
//! 4. Environment variables (applied by the caller via [`FolioConfig::apply_process_env`])

use std::path::{Path, PathBuf};

use crate::{ConfigError, FolioConfig, Result};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "folio.toml";

/// Default config filename within XDG config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for XDG directory resolution.
const APP_NAME: &str = "folio";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "FOLIO_CONFIG_DIR";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file.
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: FolioConfig,
    /// Sources that were checked, in order of precedence (lowest first).
    pub sources: Vec<ConfigSource>,
    /// Warnings generated during loading (e.g., plaintext secrets).
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Get paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load configuration by discovering and merging all config layers.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None, None)
}

/// Load configuration with explicit control over every layer.
///
/// `config_dir` overrides both `FOLIO_CONFIG_DIR` and the platform default.
/// `explicit` names a file that must exist and parse; unlike the discovered
/// layers, a broken explicit file is an error rather than a warning.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
    explicit: Option<&Path>,
) -> Result<LoadedConfig> {
    let mut merged = toml::Table::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    let user_config_path = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => xdg_config_path(),
    };
    if let Some(path) = user_config_path {
        sources.push(load_layer(&mut merged, &path, &mut warnings));
    }

    let project_path = project_dir
        .map(|d| d.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    sources.push(load_layer(&mut merged, &project_path, &mut warnings));

    if let Some(path) = explicit {
        let layer = read_layer(path)?;
        FolioConfig::merge_toml(&mut merged, layer);
        sources.push(ConfigSource {
            path: path.to_path_buf(),
            loaded: true,
        });
    }

    let config: FolioConfig = toml::Value::Table(merged).try_into()?;
    check_plaintext_secrets(&config, &mut warnings);

    Ok(LoadedConfig {
        config,
        sources,
        warnings,
    })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<FolioConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    FolioConfig::from_toml(&contents)
}

/// Get the XDG config file path for folio.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Get the XDG config directory for folio.
///
/// Checks `FOLIO_CONFIG_DIR` env var first, then falls back to platform default.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Read one file as a raw table, checking it deserializes on its own.
fn read_layer(path: &Path) -> Result<toml::Table> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    let table: toml::Table = toml::from_str(&contents)?;
    let _: FolioConfig = toml::Value::Table(table.clone()).try_into()?;
    Ok(table)
}

/// Try to load a discovered config file and merge it into the accumulated table.
fn load_layer(merged: &mut toml::Table, path: &Path, warnings: &mut Vec<String>) -> ConfigSource {
    let loaded = if !path.is_file() {
        false
    } else {
        match read_layer(path) {
            Ok(layer) => {
                FolioConfig::merge_toml(merged, layer);
                true
            }
            Err(e) => {
                warnings.push(format!("Failed to load {}: {}", path.display(), e));
                false
            }
        }
    };

    ConfigSource {
        path: path.to_path_buf(),
        loaded,
    }
}

/// Warn about secrets stored in config files.
fn check_plaintext_secrets(config: &FolioConfig, warnings: &mut Vec<String>) {
    if config.llm.api_key.is_some() {
        warnings.push(
            "[llm] contains a plaintext api_key. Consider the OPENAI_API_KEY \
             environment variable instead."
                .to_string(),
        );
    }
    if config.notion.token.is_some() {
        warnings.push(
            "[notion] contains a plaintext token. Consider the NOTION_TOKEN \
             environment variable instead."
                .to_string(),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[llm]\nmodel = \"gpt-4o\"\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is not valid toml {{{{").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_no_files() {
        let dir = TempDir::new().unwrap();
        let empty_config_dir = TempDir::new().unwrap();
        let loaded =
            load_config_with_options(Some(dir.path()), Some(empty_config_dir.path()), None)
                .unwrap();
        assert_eq!(loaded.config, FolioConfig::default());
        assert!(loaded.loaded_from().is_empty());
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_load_config_layered_merge() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();

        fs::write(
            user_dir.path().join("config.toml"),
            r#"
[server]
bind = "127.0.0.1:7000"
cors_origins = ["https://app.example.com"]

[agent]
max_iterations = 4
"#,
        )
        .unwrap();
        fs::write(
            project_dir.path().join("folio.toml"),
            r#"
[server]
bind = "127.0.0.1:7001"
"#,
        )
        .unwrap();

        let loaded =
            load_config_with_options(Some(project_dir.path()), Some(user_dir.path()), None)
                .unwrap();
        let config = &loaded.config;

        assert_eq!(config.server.bind, "127.0.0.1:7001");
        assert_eq!(config.server.cors_origins, vec!["https://app.example.com"]);
        assert_eq!(config.agent.max_iterations, 4);
        assert_eq!(loaded.loaded_from().len(), 2);
    }

    #[test]
    fn test_explicit_file_wins() {
        let project_dir = TempDir::new().unwrap();
        let empty = TempDir::new().unwrap();
        fs::write(project_dir.path().join("folio.toml"), "[llm]\nmodel = \"a\"\n").unwrap();
        let explicit = project_dir.path().join("override.toml");
        fs::write(&explicit, "[llm]\nmodel = \"b\"\n").unwrap();

        let loaded = load_config_with_options(
            Some(project_dir.path()),
            Some(empty.path()),
            Some(&explicit),
        )
        .unwrap();
        assert_eq!(loaded.config.llm.model, "b");
    }

    #[test]
    fn test_explicit_file_missing_is_error() {
        let empty = TempDir::new().unwrap();
        let result = load_config_with_options(
            Some(empty.path()),
            Some(empty.path()),
            Some(Path::new("/nonexistent/folio.toml")),
        );
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_malformed_layer_warns_but_continues() {
        let dir = TempDir::new().unwrap();
        let empty = TempDir::new().unwrap();
        fs::write(dir.path().join("folio.toml"), "[agent]\nmax_iterations = \"ten\"\n").unwrap();

        let loaded = load_config_with_options(Some(dir.path()), Some(empty.path()), None).unwrap();
        assert_eq!(loaded.config.agent.max_iterations, 10);
        assert!(loaded.warnings[0].contains("Failed to load"));
    }

    #[test]
    fn test_plaintext_secret_warning() {
        let dir = TempDir::new().unwrap();
        let empty = TempDir::new().unwrap();
        fs::write(
            dir.path().join("folio.toml"),
            "[llm]\napi_key = \"sk-secret\"\n\n[notion]\ntoken = \"secret_x\"\n",
        )
        .unwrap();

        let loaded = load_config_with_options(Some(dir.path()), Some(empty.path()), None).unwrap();
        assert_eq!(loaded.warnings.len(), 2);
        assert!(loaded.warnings[0].contains("[llm]"));
        assert!(loaded.warnings[1].contains("[notion]"));
    }

    #[test]
    #[serial]
    fn test_xdg_config_dir_env_override() {
        let dir = TempDir::new().unwrap();
        // SAFETY: serialized with every other test touching the process env
        unsafe { std::env::set_var(CONFIG_DIR_ENV, dir.path()) };
        let resolved = xdg_config_dir();
        unsafe { std::env::remove_var(CONFIG_DIR_ENV) };

        assert_eq!(resolved.as_deref(), Some(dir.path()));
    }

    #[test]
    #[serial]
    fn test_apply_process_env() {
        // SAFETY: serialized with every other test touching the process env
        unsafe { std::env::set_var("BACKEND_BASE_URL", "http://backend.test") };
        let mut config = FolioConfig::new();
        config.apply_process_env();
        unsafe { std::env::remove_var("BACKEND_BASE_URL") };

        assert_eq!(config.backend.base_url, "http://backend.test");
    }
}

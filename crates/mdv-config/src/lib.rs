//! Configuration management for the markdown viewer.
//!
//! Parses `mdv.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. CLI settings can
//! be applied during load via [`CliSettings`] and take precedence over file
//! values.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdv.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Kroki URL for diagram rendering.
    pub kroki_url: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diagram rendering configuration (optional section).
    pub diagrams: DiagramsConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Diagram rendering configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Kroki server URL. When absent, the built-in default is used.
    pub kroki_url: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `mdv.toml` in the current directory and its parents,
    /// falling back to defaults when nothing is found.
    ///
    /// CLI settings are applied after loading, so CLI arguments take
    /// precedence over config file values.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams.kroki_url = Some(kroki_url.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.diagrams.kroki_url {
            if url.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "diagrams.kroki_url cannot be empty".into(),
                ));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "diagrams.kroki_url must start with http:// or https://, got: {url}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "[diagrams]\nkroki_url = \"http://localhost:8000\"\n",
        );

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(
            config.diagrams.kroki_url.as_deref(),
            Some("http://localhost:8000")
        );
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/mdv.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "");

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.diagrams.kroki_url, None);
    }

    #[test]
    fn test_cli_settings_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "[diagrams]\nkroki_url = \"http://from-file:8000\"\n",
        );

        let settings = CliSettings {
            kroki_url: Some("http://from-cli:9000".to_owned()),
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert_eq!(
            config.diagrams.kroki_url.as_deref(),
            Some("http://from-cli:9000")
        );
    }

    #[test]
    fn test_invalid_kroki_url_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[diagrams]\nkroki_url = \"ftp://nope\"\n");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[diagrams\nkroki_url=");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

//! Configuration file handling for ~/.nowcaster/config.ini.
//!
//! Settings structs live in [`super::settings`], parsing in
//! [`super::parser`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::ConfigFile;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read or parse the config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Required key is absent
    #[error("Missing configuration: {section}.{key} is required")]
    MissingValue { section: String, key: String },

    /// Section name is not recognized
    #[error("Unknown configuration section: [{0}]")]
    UnknownSection(String),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.nowcaster/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn load_from_str(content: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(content)
            .map_err(|e| ConfigFileError::ReadError(ini::Error::Parse(e)))?;
        super::parser::parse_ini(&ini)
    }
}

/// Get the path to the config directory (~/.nowcaster).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".nowcaster")
}

/// Get the path to the config file (~/.nowcaster/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_SEARCH_RADIUS};

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert!(config.radar.sources.is_empty());
        assert!(config.radar.base_map.is_none());
        assert_eq!(config.radar.search_radius, DEFAULT_SEARCH_RADIUS);
        assert_eq!(config.http.timeout, DEFAULT_HTTP_TIMEOUT_SECS);
        assert!(config.logging.file.ends_with("nowcaster.log"));
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert!(config.radar.sources.is_empty());
        assert_eq!(config.http.timeout, DEFAULT_HTTP_TIMEOUT_SECS);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(
            &config_path,
            r#"
[http]
timeout = 12

[source.radar]
zoom = 7

[source.radar.legend]
rain = #0000FF

[source.radar.layer.now]
url = https://tiles.example.com/{z}/{x}/{y}.png
"#,
        )
        .unwrap();

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config.http.timeout, 12);
        assert_eq!(config.radar.sources.len(), 1);
        assert_eq!(config.radar.sources[0].layers[0].name, "now");
    }

    #[test]
    fn test_config_file_path() {
        let path = config_file_path();
        assert!(path.ends_with(".nowcaster/config.ini"));
    }
}

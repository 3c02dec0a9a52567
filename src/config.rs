//! Configuration.
//!
//! Settings are a JSON document. Every section and field has a default,
//! so a missing file or a partial document is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while loading or saving settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the settings file failed.
    #[error("Failed to read settings: {0}")]
    Read(std::io::Error),

    /// Writing the settings file failed.
    #[error("Failed to write settings: {0}")]
    Write(std::io::Error),

    /// The settings file is not valid JSON for [`Settings`].
    #[error("Failed to parse settings: {0}")]
    Parse(serde_json::Error),

    /// Creating the settings directory failed.
    #[error("Failed to create config directory: {0}")]
    CreateDir(std::io::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Relay and option storage.
    #[serde(default)]
    pub storage: StorageSettings,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// `SQLite` database file holding relays and organization options.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("relay-trust.db")
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or returns defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let settings = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Saves settings to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(ConfigError::CreateDir)?;
            }
        }

        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Parse)?;
        std::fs::write(path, content).map_err(ConfigError::Write)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(
            settings.storage.database_path,
            PathBuf::from("relay-trust.db")
        );
        assert_eq!(settings.logging.filter, "info");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"logging": {"filter": "relay_trust=debug"}}"#).unwrap();
        assert_eq!(settings.logging.filter, "relay_trust=debug");
        assert_eq!(settings.storage, StorageSettings::default());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config/settings.json");

        let mut settings = Settings::default();
        settings.storage.database_path = dir.path().join("relays.db");
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ nope").unwrap();

        let result = Settings::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}

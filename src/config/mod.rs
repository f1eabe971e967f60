//! Configuration management
//!
//! This module handles loading and parsing configuration for the demo content
//! importer. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Content source and destination configuration
    #[serde(default)]
    pub content: ContentConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/content.db".to_string()
}

/// Content configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory holding the bundled CSV files and `images/`
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Public files directory that images are copied into
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    /// State key under which created entity UUIDs are recorded
    #[serde(default = "default_state_key")]
    pub state_key: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            public_dir: default_public_dir(),
            state_key: default_state_key(),
        }
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("default_content")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_state_key() -> String {
    "demo_content_uuids".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "demo_content=info".to_string()
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - DEMO_CONTENT_DATABASE_URL
    /// - DEMO_CONTENT_SOURCE_DIR
    /// - DEMO_CONTENT_PUBLIC_DIR
    /// - DEMO_CONTENT_STATE_KEY
    /// - DEMO_CONTENT_LOG
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DEMO_CONTENT_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(dir) = std::env::var("DEMO_CONTENT_SOURCE_DIR") {
            self.content.source_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("DEMO_CONTENT_PUBLIC_DIR") {
            self.content.public_dir = PathBuf::from(dir);
        }
        if let Ok(key) = std::env::var("DEMO_CONTENT_STATE_KEY") {
            self.content.state_key = key;
        }
        if let Ok(filter) = std::env::var("DEMO_CONTENT_LOG") {
            self.logging.filter = filter;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.content.state_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "content.state_key must not be empty".to_string(),
            ));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

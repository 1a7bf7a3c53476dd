//! Configuration file parsing for the router.
//!
//! Loads settings from TOML files including bind address, database path
//! and the sweeper settings.

use serde::Deserialize;
use shelfwatch_sweeper::SweeperConfig;
use std::path::Path;
use thiserror::Error;

/// Router configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// Field present but unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Router configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Also run scheduled passes in the background
    #[serde(default)]
    pub run_worker: bool,

    /// Sweeper settings
    #[serde(default)]
    pub sweeper: SweeperConfig,
}

fn default_database_path() -> String {
    "shelfwatch.db".to_string()
}

impl RouterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: RouterConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check fields serde cannot check
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.is_empty() {
            return Err(ConfigError::MissingField("database_path".to_string()));
        }
        self.sweeper
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        RouterConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            database_path: ":memory:".to_string(),
            run_worker: false,
            sweeper: SweeperConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Whether the database lives only inside one connection
    pub fn is_in_memory(&self) -> bool {
        self.database_path == ":memory:"
    }
}

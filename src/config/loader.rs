//! Configuration loader for RAM-Search
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use crate::core::types::{parse_address, Address, WordType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_search")]
    pub search: SearchConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Search range and reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_word_type")]
    pub word_type: WordType,
    #[serde(default = "default_start_address")]
    pub start_address: String,
    #[serde(default = "default_byte_count")]
    pub byte_count: u64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl SearchConfig {
    /// The configured start address, parsed
    pub fn start(&self) -> Result<Address, ConfigError> {
        parse_address(&self.start_address).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        debug!("Loaded configuration from {}", self.config_path.display());
        Ok(config)
    }

    /// Loads configuration or returns defaults if the file doesn't exist
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|e| {
            debug!("Using default configuration: {}", e);
            Config::default()
        })
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads configuration from the default location
pub fn load_config() -> Result<Config, ConfigError> {
    let loader = ConfigLoader::new("ram-search.toml");
    Ok(loader.load_or_default())
}

// Default functions for serde
fn default_search() -> SearchConfig {
    let defaults = default_config();
    SearchConfig {
        word_type: defaults.search.word_type,
        start_address: defaults.search.start_address,
        byte_count: defaults.search.byte_count,
        max_results: defaults.search.max_results,
    }
}

fn default_logging() -> LoggingConfig {
    let defaults = default_config();
    LoggingConfig {
        level: defaults.logging.level,
        with_target: defaults.logging.with_target,
    }
}

// Individual field defaults
fn default_word_type() -> WordType {
    default_config().search.word_type
}

fn default_start_address() -> String {
    default_config().search.start_address
}

fn default_byte_count() -> u64 {
    default_config().search.byte_count
}

fn default_max_results() -> usize {
    default_config().search.max_results
}

fn default_log_level() -> String {
    default_config().logging.level
}

fn default_with_target() -> bool {
    default_config().logging.with_target
}

impl Default for Config {
    fn default() -> Self {
        Config {
            search: default_search(),
            logging: default_logging(),
        }
    }
}

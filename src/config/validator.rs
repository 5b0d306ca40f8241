//! Configuration validator for RAM-Search
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError, LoggingConfig, SearchConfig};

/// Upper bound on results printed by the driver
const MAX_REPORTED_RESULTS: usize = 100_000;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_search(&config.search)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates search configuration
    fn validate_search(search: &SearchConfig) -> Result<(), ConfigError> {
        let start = search.start()?;

        if search.byte_count == 0 {
            return Err(ConfigError::Invalid(
                "Search byte count must be greater than 0".to_string(),
            ));
        }

        if start.as_u64().checked_add(search.byte_count).is_none() {
            return Err(ConfigError::Invalid(format!(
                "Search range starting at {} overflows the address space",
                start
            )));
        }

        if search.max_results == 0 || search.max_results > MAX_REPORTED_RESULTS {
            return Err(ConfigError::Invalid(format!(
                "Maximum results must be between 1 and {}",
                MAX_REPORTED_RESULTS
            )));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}

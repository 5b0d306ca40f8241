//! Default configuration values for RAM-Search

use crate::core::types::WordType;
use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub search: SearchDefaults,
    pub logging: LoggingDefaults,
}

/// Default search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDefaults {
    pub word_type: WordType,
    pub start_address: String,
    pub byte_count: u64,
    pub max_results: usize,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
    pub with_target: bool,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        search: SearchDefaults {
            word_type: WordType::EightBit,
            start_address: "0x0".to_string(),
            byte_count: 0x10000, // 64KB
            max_results: 100,
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
            with_target: false,
        },
    }
}

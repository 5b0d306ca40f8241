//! Custom error types for RAM-Search
//!
//! The search engine itself never fails; these errors come from the edges
//! (parsing user input, loading snapshots).

use std::fmt;
use thiserror::Error;

/// Main error type for search operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid memory address: {0}")]
    InvalidAddress(String),

    #[error("Invalid filter value '{value}': {reason}")]
    InvalidFilterValue { value: String, reason: String },

    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("Unknown word type: {0}")]
    UnknownWordType(String),

    #[error("Snapshot too large: {size} bytes exceeds address space of {limit} bytes")]
    SnapshotTooLarge { size: u64, limit: u64 },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for search operations
pub type SearchResult<T> = Result<T, SearchError>;

impl SearchError {
    /// Creates an invalid filter value error
    pub fn invalid_filter_value(value: impl fmt::Display, reason: impl Into<String>) -> Self {
        SearchError::InvalidFilterValue {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a snapshot too large error
    pub fn snapshot_too_large(size: u64, limit: u64) -> Self {
        SearchError::SnapshotTooLarge { size, limit }
    }
}

//! Core module containing fundamental types for RAM-Search
//!
//! This module provides the foundational building blocks used throughout
//! the crate, including address handling, word types, filters and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Address,
    ComparisonType,
    FilterType,
    FilterValue,
    LogicalAddress,
    MemSize,
    SearchError,
    SearchFilter,
    SearchMatch,
    SearchResult,
    WordType,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

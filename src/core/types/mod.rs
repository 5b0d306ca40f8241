//! Core type definitions for RAM-Search
//!
//! This module contains the fundamental types shared by the engine and its
//! callers: addresses, word types, filter descriptions, matches and errors.

mod address;
mod error;
mod filter;
mod search_match;
mod word;

// Re-export all public types
pub use address::{parse_address, Address};
pub use error::{SearchError, SearchResult};
pub use filter::{ComparisonType, FilterType, FilterValue, SearchFilter};
pub use search_match::SearchMatch;
pub use word::{MemSize, WordType};

/// Address that may encode a sub-byte selector (nibbles use `address * 2 + half`)
pub type LogicalAddress = u64;

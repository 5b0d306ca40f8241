//! RAM-Search: incremental search for values in a program's memory
//!
//! Capture a range of memory with [`SearchSession::fresh`], then narrow the
//! candidates with repeated [`SearchSession::filtered`] passes against live
//! memory read through a [`MemoryProvider`].

pub mod config;
pub mod core;
pub mod memory;
pub mod search;

// Re-export main types from core module
pub use core::types::{
    parse_address, Address, ComparisonType, FilterType, FilterValue, LogicalAddress, MemSize,
    SearchError, SearchFilter, SearchMatch, SearchResult, WordType,
};

pub use memory::{MemoryBlock, MemoryImage, MemoryProvider};
pub use search::{SearchSession, WordStrategy, MAX_BLOCK_SIZE};

// Re-export core directly for full access
pub use core::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_module_accessible() {
        assert_eq!(core::VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(AUTHORS, env!("CARGO_PKG_AUTHORS"));
    }

    #[test]
    fn test_address_reexport() {
        let addr = Address::new(0x1000);
        assert_eq!(addr.as_u64(), 0x1000);
        assert_eq!(addr.to_string(), "0x00001000");
    }

    #[test]
    fn test_search_reexports() {
        let image = MemoryImage::from_bytes(vec![1, 2, 3]);
        let session = SearchSession::fresh(&image, Address::new(0), 3, WordType::EightBit);
        assert_eq!(session.matching_address_count(), 3);
        assert_eq!(WordStrategy::for_word_type(WordType::Float).padding(), 3);
    }

    #[test]
    fn test_search_error_reexport() {
        let error = SearchError::InvalidAddress("0xBAD".to_string());
        assert!(error.to_string().contains("Invalid memory address"));

        let result: SearchResult<u32> = Err(SearchError::UnknownWordType("qword".to_string()));
        assert!(result.is_err());
    }
}

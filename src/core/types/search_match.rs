//! A single located value returned by session lookups

use super::address::Address;
use super::word::MemSize;
use serde::{Deserialize, Serialize};

/// One matching address together with its raw value
///
/// `value` holds the raw value rather than a decoded one: the integer for
/// integer sizes, the little-endian bit pattern for float sizes and the first
/// byte for text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchMatch {
    pub address: Address,
    pub value: u32,
    pub mem_size: MemSize,
}

impl SearchMatch {
    pub fn new(address: Address, value: u32, mem_size: MemSize) -> Self {
        SearchMatch {
            address,
            value,
            mem_size,
        }
    }

    /// Checks if this match refers to a single nibble of a byte
    pub const fn is_nibble(&self) -> bool {
        matches!(self.mem_size, MemSize::NibbleLower | MemSize::NibbleUpper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_match_creation() {
        let m = SearchMatch::new(Address::new(0x10), 0xA, MemSize::NibbleLower);
        assert_eq!(m.address, Address::new(0x10));
        assert_eq!(m.value, 0xA);
        assert!(m.is_nibble());
        assert!(!SearchMatch::new(Address::new(0x10), 1, MemSize::EightBit).is_nibble());
    }

    #[test]
    fn test_search_match_serialization() {
        let m = SearchMatch::new(Address::new(0x1006), 0x57, MemSize::Text);
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"mem_size\":\"text\""));
        let back: SearchMatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}

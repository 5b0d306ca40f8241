//! Byte address wrapper type with hex parsing and alignment helpers

use super::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A byte address inside the searched memory space
///
/// Addresses are 64-bit so that ranges ending exactly at the top of a 32-bit
/// address space (`0xFFFFFFFF + 1`) can be represented without overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Address(pub u64);

impl Address {
    /// Creates a new address from a raw value
    pub const fn new(value: u64) -> Self {
        Address(value)
    }

    /// Returns the raw value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Checks if the address is aligned to the specified boundary
    pub const fn is_aligned(&self, alignment: u64) -> bool {
        alignment != 0 && self.0 % alignment == 0
    }

    /// Aligns the address up to the specified boundary
    pub const fn align_up(&self, alignment: u64) -> Self {
        if alignment <= 1 {
            return *self;
        }
        let rem = self.0 % alignment;
        if rem == 0 {
            *self
        } else {
            Address(self.0 + (alignment - rem))
        }
    }

    /// Adds a byte offset to the address
    pub const fn offset(&self, offset: u64) -> Self {
        Address(self.0.wrapping_add(offset))
    }
}

impl FromStr for Address {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16)
        } else if let Some(hex) = s.strip_prefix('$') {
            u64::from_str_radix(hex, 16)
        } else if s.chars().any(|c| c.is_ascii_alphabetic()) {
            u64::from_str_radix(s, 16)
        } else {
            s.parse::<u64>()
        };

        value
            .map(Address::new)
            .map_err(|_| SearchError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Address::new(value)
    }
}

impl From<u32> for Address {
    fn from(value: u32) -> Self {
        Address::new(u64::from(value))
    }
}

/// Parses an address, mapping failures into the crate error type
pub fn parse_address(s: &str) -> SearchResult<Address> {
    s.parse()
}

//! Captured copies of contiguous memory ranges

use super::provider::MemoryProvider;
use crate::core::types::Address;

/// An owned snapshot of `bytes.len()` bytes starting at `address`
///
/// Blocks are never modified after capture. The trailing bytes of a block may
/// be padding: bytes only present so the last candidate word can be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBlock {
    address: Address,
    bytes: Vec<u8>,
}

impl MemoryBlock {
    pub fn new(address: Address, bytes: Vec<u8>) -> Self {
        MemoryBlock { address, bytes }
    }

    /// Reads `size` bytes at `address` from the provider
    pub fn capture<P: MemoryProvider + ?Sized>(
        provider: &P,
        address: Address,
        size: usize,
    ) -> Self {
        let mut bytes = vec![0u8; size];
        provider.read_memory(address, &mut bytes);
        MemoryBlock { address, bytes }
    }

    /// Address of the first captured byte
    pub fn address(&self) -> Address {
        self.address
    }

    /// Number of captured bytes, padding included
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Address one past the last captured byte
    pub fn end(&self) -> u64 {
        self.address.as_u64() + self.bytes.len() as u64
    }

    pub fn contains(&self, address: Address) -> bool {
        address >= self.address && address.as_u64() < self.end()
    }

    /// Captured bytes from `address` to the end of the block
    pub fn bytes_from(&self, address: Address) -> Option<&[u8]> {
        if !self.contains(address) {
            return None;
        }
        let offset = (address.as_u64() - self.address.as_u64()) as usize;
        Some(&self.bytes[offset..])
    }

    /// Copies captured bytes starting at `address` into `buffer`, zero-filling
    /// what the block does not hold. Returns the number of bytes copied.
    pub fn copy_into(&self, address: Address, buffer: &mut [u8]) -> usize {
        buffer.fill(0);
        match self.bytes_from(address) {
            Some(available) => {
                let count = available.len().min(buffer.len());
                buffer[..count].copy_from_slice(&available[..count]);
                count
            }
            None => 0,
        }
    }
}

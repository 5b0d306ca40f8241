//! The seam between the search engine and whatever owns the live memory

use crate::core::types::Address;

/// Source of live memory for captures and filter passes
///
/// Implementations never fail: bytes that cannot be read (outside the memory
/// space, unmapped, ...) are reported as zero.
pub trait MemoryProvider {
    /// Size of the addressable memory space in bytes
    fn total_size(&self) -> u64;

    /// Fills `buffer` with the bytes starting at `address`
    fn read_memory(&self, address: Address, buffer: &mut [u8]);

    /// Reads `len` bytes into a freshly allocated buffer
    fn read_bytes(&self, address: Address, len: usize) -> Vec<u8> {
        let mut buffer = vec![0u8; len];
        self.read_memory(address, &mut buffer);
        buffer
    }
}

impl<T: MemoryProvider + ?Sized> MemoryProvider for &T {
    fn total_size(&self) -> u64 {
        (**self).total_size()
    }

    fn read_memory(&self, address: Address, buffer: &mut [u8]) {
        (**self).read_memory(address, buffer)
    }
}

impl<T: MemoryProvider + ?Sized> MemoryProvider for Box<T> {
    fn total_size(&self) -> u64 {
        (**self).total_size()
    }

    fn read_memory(&self, address: Address, buffer: &mut [u8]) {
        (**self).read_memory(address, buffer)
    }
}

/// A plain byte slice is a memory space starting at address zero
impl MemoryProvider for [u8] {
    fn total_size(&self) -> u64 {
        self.len() as u64
    }

    fn read_memory(&self, address: Address, buffer: &mut [u8]) {
        buffer.fill(0);

        let Ok(start) = usize::try_from(address.as_u64()) else {
            return;
        };
        if start >= self.len() {
            return;
        }

        let available = (self.len() - start).min(buffer.len());
        buffer[..available].copy_from_slice(&self[start..start + available]);
    }
}

impl MemoryProvider for Vec<u8> {
    fn total_size(&self) -> u64 {
        self.as_slice().total_size()
    }

    fn read_memory(&self, address: Address, buffer: &mut [u8]) {
        self.as_slice().read_memory(address, buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_provider_reads() {
        let memory: &[u8] = &[0x00, 0x12, 0x34, 0xAB, 0x56];
        assert_eq!(memory.total_size(), 5);

        let mut buffer = [0xFFu8; 3];
        memory.read_memory(Address::new(1), &mut buffer);
        assert_eq!(buffer, [0x12, 0x34, 0xAB]);
    }

    #[test]
    fn test_slice_provider_zero_fills_out_of_range() {
        let memory = vec![1u8, 2, 3];

        assert_eq!(memory.read_bytes(Address::new(2), 4), vec![3, 0, 0, 0]);
        assert_eq!(memory.read_bytes(Address::new(10), 2), vec![0, 0]);
        assert_eq!(memory.read_bytes(Address::new(u64::MAX), 2), vec![0, 0]);
    }

    #[test]
    fn test_provider_through_references() {
        fn size_of(provider: impl MemoryProvider) -> u64 {
            provider.total_size()
        }

        let memory = vec![0u8; 16];
        assert_eq!(size_of(&memory), 16);

        let boxed: Box<dyn MemoryProvider> = Box::new(memory);
        assert_eq!(size_of(&boxed), 16);
        assert_eq!(boxed.read_bytes(Address::new(0), 2), vec![0, 0]);
    }
}

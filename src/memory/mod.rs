//! Memory access module: the provider seam, captured blocks and an in-process image
//!
//! This module provides:
//! - The `MemoryProvider` trait through which live memory is read
//! - `MemoryBlock`, an immutable snapshot of a contiguous range
//! - `MemoryImage`, a sparse provider used by the binary, tests and benchmarks

pub mod block;
pub mod image;
pub mod provider;

pub use block::MemoryBlock;
pub use image::MemoryImage;
pub use provider::MemoryProvider;

use crate::core::types::Address;

/// Clamps a requested range to the provider's memory space.
///
/// A start beyond the end yields an empty range at `start`.
pub fn clamp_range<P: MemoryProvider + ?Sized>(
    provider: &P,
    start: Address,
    byte_count: u64,
) -> (Address, u64) {
    let total = provider.total_size();
    if start.as_u64() >= total {
        return (start, 0);
    }

    let available = total - start.as_u64();
    (start, byte_count.min(available))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_range() {
        let image = MemoryImage::new(0x1_0000_0000);

        assert_eq!(
            clamp_range(&image, Address::new(0xFFFF_FFF0), 0x100),
            (Address::new(0xFFFF_FFF0), 0x10)
        );
        assert_eq!(clamp_range(&image, Address::new(0), 0x100), (Address::new(0), 0x100));
        assert_eq!(
            clamp_range(&image, Address::new(0x1_0000_0000), 4),
            (Address::new(0x1_0000_0000), 0)
        );
    }
}

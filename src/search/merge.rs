//! Combining the shape of one session with the captured bytes of another

use crate::core::types::Address;
use crate::memory::MemoryBlock;
use tracing::trace;

/// Rebuilds `shape` with its bytes taken from `memory`
///
/// Every returned block has the address and size of the corresponding shape
/// block. Bytes are copied from whichever memory blocks overlap them, split
/// across block boundaries where needed; bytes no memory block covers are zero.
pub fn merge_block_contents(memory: &[MemoryBlock], shape: &[MemoryBlock]) -> Vec<MemoryBlock> {
    shape
        .iter()
        .map(|target| {
            let start = target.address().as_u64();
            let end = target.end();
            let mut bytes = vec![0u8; target.size()];

            // memory blocks are sorted, so only those starting before `end` can overlap
            let stop = memory.partition_point(|b| b.address().as_u64() < end);
            let mut copied = 0usize;
            for source in &memory[..stop] {
                let overlap_start = source.address().as_u64().max(start);
                let overlap_end = source.end().min(end);
                if overlap_start >= overlap_end {
                    continue;
                }

                let count = (overlap_end - overlap_start) as usize;
                let dst = (overlap_start - start) as usize;
                if let Some(src) = source.bytes_from(Address::new(overlap_start)) {
                    bytes[dst..dst + count].copy_from_slice(&src[..count]);
                    copied += count;
                }
            }

            trace!(
                "merged block {} ({} bytes, {} copied)",
                target.address(),
                target.size(),
                copied
            );
            MemoryBlock::new(target.address(), bytes)
        })
        .collect()
}

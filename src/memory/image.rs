//! Sparse in-process memory space
//!
//! `MemoryImage` stands in for a running system: a declared address space with
//! a handful of populated regions. Anything outside those regions reads as
//! zero. Tests mutate it between filter passes to simulate a program running.

use super::provider::MemoryProvider;
use crate::core::types::{Address, SearchError, SearchResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Memory space backed by non-overlapping byte regions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryImage {
    total_size: u64,
    regions: BTreeMap<u64, Vec<u8>>,
}

impl MemoryImage {
    /// Creates an empty (all zero) memory space of `total_size` bytes
    pub fn new(total_size: u64) -> Self {
        MemoryImage {
            total_size,
            regions: BTreeMap::new(),
        }
    }

    /// Creates a memory space holding exactly `bytes`, starting at address zero
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let total_size = bytes.len() as u64;
        let mut regions = BTreeMap::new();
        if !bytes.is_empty() {
            regions.insert(0, bytes);
        }

        MemoryImage {
            total_size,
            regions,
        }
    }

    /// Loads a raw memory dump; the file's first byte is address zero
    pub fn load(path: impl AsRef<Path>) -> SearchResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        debug!("Loaded {} byte snapshot from {}", bytes.len(), path.display());
        Ok(Self::from_bytes(bytes))
    }

    /// Loads a raw memory dump into a memory space of `total_size` bytes at `base`
    pub fn load_at(path: impl AsRef<Path>, base: Address, total_size: u64) -> SearchResult<Self> {
        let bytes = fs::read(path.as_ref())?;
        let end = base.as_u64().saturating_add(bytes.len() as u64);
        if end > total_size {
            return Err(SearchError::snapshot_too_large(end, total_size));
        }

        let mut image = Self::new(total_size);
        image.write(base, &bytes);
        Ok(image)
    }

    /// Builder form of [`MemoryImage::write`]
    pub fn with_bytes(mut self, address: Address, bytes: &[u8]) -> Self {
        self.write(address, bytes);
        self
    }

    /// Number of separately stored regions
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Writes bytes into the memory space, merging with neighbouring regions.
    /// Bytes beyond the end of the memory space are dropped.
    pub fn write(&mut self, address: Address, bytes: &[u8]) {
        let start = address.as_u64();
        if start >= self.total_size || bytes.is_empty() {
            return;
        }

        let len = (bytes.len() as u64).min(self.total_size - start);
        let bytes = &bytes[..len as usize];
        let end = start + len;

        // regions overlapping or touching [start, end]
        let touching: Vec<u64> = self
            .regions
            .range(..=end)
            .filter(|(base, region)| **base + region.len() as u64 >= start)
            .map(|(&base, _)| base)
            .collect();

        let mut merged_start = start;
        let mut merged_end = end;
        for base in &touching {
            let region_len = self.regions.get(base).map_or(0, Vec::len) as u64;
            merged_start = merged_start.min(*base);
            merged_end = merged_end.max(base + region_len);
        }

        let mut merged = vec![0u8; (merged_end - merged_start) as usize];
        for base in touching {
            if let Some(region) = self.regions.remove(&base) {
                let offset = (base - merged_start) as usize;
                merged[offset..offset + region.len()].copy_from_slice(&region);
            }
        }

        let offset = (start - merged_start) as usize;
        merged[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.regions.insert(merged_start, merged);
    }

    /// Writes a single byte
    pub fn write_u8(&mut self, address: Address, value: u8) {
        self.write(address, &[value]);
    }
}

impl MemoryProvider for MemoryImage {
    fn total_size(&self) -> u64 {
        self.total_size
    }

    fn read_memory(&self, address: Address, buffer: &mut [u8]) {
        buffer.fill(0);

        let start = address.as_u64();
        if start >= self.total_size {
            return;
        }
        let end = start
            .saturating_add(buffer.len() as u64)
            .min(self.total_size);

        for (&base, region) in self.regions.range(..end).rev() {
            let region_end = base + region.len() as u64;
            if region_end <= start {
                break;
            }

            let copy_start = base.max(start);
            let copy_end = region_end.min(end);
            let src = &region[(copy_start - base) as usize..(copy_end - base) as usize];
            let dst_offset = (copy_start - start) as usize;
            buffer[dst_offset..dst_offset + src.len()].copy_from_slice(src);
        }
    }
}

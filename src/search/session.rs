//! Search sessions: the candidates left after a capture or a filter pass
//!
//! A session owns the memory blocks it was built from together with the list
//! of matching logical addresses. Sessions are never modified by a filter
//! pass; each pass produces a new session from its source, so a caller can
//! keep any number of them around and undo by going back to an older one.

use super::filter::{self, Comparator, FilterSource, TEXT_COMPARE_LENGTH};
use super::merge::merge_block_contents;
use super::strategy::{format_raw, read_raw, write_raw, WordStrategy};
use crate::core::types::{
    Address, ComparisonType, FilterType, FilterValue, LogicalAddress, MemSize, SearchFilter,
    SearchMatch, WordType,
};
use crate::memory::{self, MemoryBlock, MemoryProvider};
use std::ptr;
use tracing::debug;

/// Largest number of candidate bytes captured into a single block
pub const MAX_BLOCK_SIZE: u64 = 256 * 1024;

/// The state of a search after a capture or a filter pass
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSession {
    strategy: &'static WordStrategy,
    blocks: Vec<MemoryBlock>,
    filter: SearchFilter,
    matching_addresses: Option<Vec<LogicalAddress>>,
    padding: usize,
}

impl SearchSession {
    /// Captures `byte_count` bytes starting at `start`. Every address in the
    /// range whose whole word fits is a candidate.
    pub fn fresh<P: MemoryProvider + ?Sized>(
        provider: &P,
        start: Address,
        byte_count: u64,
        word_type: WordType,
    ) -> Self {
        let strategy = WordStrategy::for_word_type(word_type);
        let padding = strategy.padding();
        let (start, available) = memory::clamp_range(provider, start, byte_count);

        let mut remaining = available.saturating_sub(padding as u64);
        let mut address = start;
        let mut blocks = Vec::new();
        while remaining > 0 {
            let chunk = remaining.min(MAX_BLOCK_SIZE);
            blocks.push(MemoryBlock::capture(provider, address, chunk as usize + padding));
            address = address.offset(chunk);
            remaining -= chunk;
        }

        let session = SearchSession {
            strategy,
            blocks,
            filter: SearchFilter::default(),
            matching_addresses: None,
            padding,
        };

        debug!(
            "Captured {} bytes at {} in {} mode: {} blocks, {} candidates",
            available,
            start,
            word_type,
            session.blocks.len(),
            session.matching_address_count()
        );

        session
    }

    /// Runs one filter pass of `source` against live memory
    pub fn filtered<P: MemoryProvider + ?Sized>(
        source: &SearchSession,
        provider: &P,
        filter: SearchFilter,
    ) -> Self {
        if filter.filter_type == FilterType::None {
            return source.clone();
        }

        let output = filter::apply_filter(source.filter_source(), provider, &filter);
        SearchSession {
            strategy: source.strategy,
            blocks: output.blocks,
            filter,
            matching_addresses: Some(output.matches),
            padding: output.padding,
        }
    }

    /// Filters the candidates of `address_source`, using the bytes captured
    /// by `memory_source` as the previous values
    pub fn filtered_merged<P: MemoryProvider + ?Sized>(
        memory_source: &SearchSession,
        address_source: &SearchSession,
        provider: &P,
        filter: SearchFilter,
    ) -> Self {
        if ptr::eq(memory_source, address_source) {
            return Self::filtered(address_source, provider, filter);
        }

        let merged = SearchSession {
            strategy: address_source.strategy,
            blocks: merge_block_contents(&memory_source.blocks, &address_source.blocks),
            filter: address_source.filter.clone(),
            matching_addresses: address_source.matching_addresses.clone(),
            padding: address_source.padding,
        };
        Self::filtered(&merged, provider, filter)
    }

    /// Builds a session holding exactly the given matches, with their values
    /// as the captured bytes. Matches at addresses the word type can't hold
    /// are skipped.
    pub fn from_matches(matches: &[SearchMatch], word_type: WordType) -> Self {
        let strategy = WordStrategy::for_word_type(word_type);
        let padding = strategy.padding();

        let mut located: Vec<(LogicalAddress, &SearchMatch)> = matches
            .iter()
            .filter(|m| strategy.is_address_valid(m.address))
            .map(|m| (strategy.logical_for(m.address, m.mem_size), m))
            .collect();
        located.sort_by_key(|(logical, _)| *logical);
        located.dedup_by_key(|(logical, _)| *logical);

        let logicals: Vec<LogicalAddress> = located.iter().map(|(logical, _)| *logical).collect();
        let mut blocks = Vec::new();
        let mut index = 0;
        while index < located.len() {
            let run_len = filter::run_length(strategy, &logicals[index..], padding);
            let run = &located[index..index + run_len];
            index += run_len;

            let first = strategy.from_logical(run[0].0).as_u64();
            let last = strategy.from_logical(run[run_len - 1].0).as_u64();
            let size = (last - first).saturating_add(1 + padding as u64).min(u64::MAX - first);
            let mut bytes = vec![0u8; size as usize];
            for (logical, m) in run {
                let offset = (strategy.from_logical(*logical).as_u64() - first) as usize;
                if let Some(slot) = bytes.get_mut(offset..) {
                    write_raw(m.mem_size, m.value, slot);
                }
            }
            blocks.push(MemoryBlock::new(Address::new(first), bytes));
        }

        SearchSession {
            strategy,
            blocks,
            filter: SearchFilter::last_known(ComparisonType::Equals),
            matching_addresses: Some(logicals),
            padding,
        }
    }

    fn filter_source(&self) -> FilterSource<'_> {
        FilterSource {
            strategy: self.strategy,
            blocks: &self.blocks,
            padding: self.padding,
            matches: self.matching_addresses.as_deref(),
        }
    }

    pub fn strategy(&self) -> &'static WordStrategy {
        self.strategy
    }

    pub fn word_type(&self) -> WordType {
        self.strategy.word_type()
    }

    pub fn mem_size(&self) -> MemSize {
        self.strategy.mem_size()
    }

    pub fn filter(&self) -> &SearchFilter {
        &self.filter
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter.filter_type
    }

    pub fn comparison(&self) -> ComparisonType {
        self.filter.comparison
    }

    pub fn filter_value(&self) -> &FilterValue {
        &self.filter.value
    }

    pub fn blocks(&self) -> &[MemoryBlock] {
        &self.blocks
    }

    /// Trailing bytes each block holds beyond its last candidate
    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn is_filtered(&self) -> bool {
        self.matching_addresses.is_some()
    }

    /// Sorted matching logical addresses; `None` before the first filter
    pub fn matching_addresses(&self) -> Option<&[LogicalAddress]> {
        self.matching_addresses.as_deref()
    }

    pub fn matching_address_count(&self) -> usize {
        match &self.matching_addresses {
            Some(matches) => matches.len(),
            None => self
                .blocks
                .iter()
                .map(|block| self.strategy.candidate_count(
                    block.address(),
                    self.candidate_len(block),
                ))
                .sum::<u64>() as usize,
        }
    }

    /// The `index`th candidate with the value captured for it
    pub fn matching_address(&self, index: usize) -> Option<SearchMatch> {
        if let Some(matches) = &self.matching_addresses {
            return matches.get(index).and_then(|&logical| self.match_at(logical));
        }

        let mut index = index as u64;
        for block in &self.blocks {
            let len = self.candidate_len(block);
            let count = self.strategy.candidate_count(block.address(), len);
            if index < count {
                let logical = self.strategy.nth_candidate(block.address(), len, index)?;
                return self.match_at(logical);
            }
            index -= count;
        }

        None
    }

    /// All candidates in ascending order
    pub fn iter_matches(&self) -> impl Iterator<Item = SearchMatch> + '_ {
        (0..self.matching_address_count()).filter_map(move |index| self.matching_address(index))
    }

    fn match_at(&self, logical: LogicalAddress) -> Option<SearchMatch> {
        self.value_at(self.strategy.from_logical(logical), self.strategy.mem_size_of(logical))
    }

    fn candidate_len(&self, block: &MemoryBlock) -> u64 {
        block.size().saturating_sub(self.padding) as u64
    }

    /// The block whose candidate range holds `address`
    fn candidate_block(&self, address: Address) -> Option<&MemoryBlock> {
        let index = self.blocks.partition_point(|block| block.address() <= address);
        let block = self.blocks.get(index.checked_sub(1)?)?;
        let end = block.address().as_u64() + self.candidate_len(block);
        (address.as_u64() < end).then_some(block)
    }

    /// The captured value of a word, if its address is inside a block
    pub fn value_at(&self, address: Address, mem_size: MemSize) -> Option<SearchMatch> {
        let block = self.candidate_block(address)?;
        let bytes = block.bytes_from(address)?;
        Some(SearchMatch::new(address, read_raw(mem_size, bytes), mem_size))
    }

    /// The captured value of a word, rendered for display
    pub fn formatted_value(&self, address: Address, mem_size: MemSize) -> String {
        if mem_size == MemSize::Text {
            let mut bytes = [0u8; TEXT_COMPARE_LENGTH];
            self.get_bytes(address, &mut bytes);
            return render_text(&bytes);
        }

        self.value_at(address, mem_size)
            .map(|m| format_raw(m.value, m.mem_size))
            .unwrap_or_default()
    }

    pub fn contains_address(&self, address: Address) -> bool {
        if !self.strategy.is_address_valid(address) {
            return false;
        }

        match &self.matching_addresses {
            Some(matches) => {
                let lower = self.strategy.to_logical(address, false);
                matches.binary_search(&lower).is_ok()
                    || (self.strategy.is_nibble()
                        && matches.binary_search(&self.strategy.to_logical(address, true)).is_ok())
            }
            None => self.candidate_block(address).is_some(),
        }
    }

    /// Copies captured bytes starting at `address`. Bytes no block covers are
    /// zero; returns `false` if there were any.
    pub fn get_bytes(&self, address: Address, buffer: &mut [u8]) -> bool {
        buffer.fill(0);
        let mut complete = true;
        let mut cursor = 0usize;

        while cursor < buffer.len() {
            let Some(current) = address.as_u64().checked_add(cursor as u64) else {
                // the rest lies past the end of the address space
                return false;
            };

            match self.covering_block(current) {
                Ok(block) => {
                    cursor += block.copy_into(Address::new(current), &mut buffer[cursor..]);
                }
                Err(None) => return false,
                Err(Some(next)) => {
                    complete = false;
                    let remaining = (buffer.len() - cursor) as u64;
                    cursor += (next - current).min(remaining) as usize;
                }
            }
        }

        complete
    }

    /// Number of bytes from `address` on, up to `max`, that blocks cover
    /// without a gap
    fn covered_len(&self, address: Address, max: usize) -> usize {
        let mut covered = 0usize;
        while covered < max {
            let Some(current) = address.as_u64().checked_add(covered as u64) else {
                break;
            };
            match self.covering_block(current) {
                Ok(block) => covered += (block.end() - current).min(max as u64) as usize,
                Err(_) => break,
            }
        }
        covered.min(max)
    }

    /// The block holding byte `address`, or else the start of the next block
    fn covering_block(&self, address: u64) -> Result<&MemoryBlock, Option<u64>> {
        let index = self.blocks.partition_point(|block| block.address().as_u64() <= address);
        index
            .checked_sub(1)
            .map(|i| &self.blocks[i])
            .filter(|block| block.end() > address)
            .ok_or_else(|| self.blocks.get(index).map(|block| block.address().as_u64()))
    }

    /// Removes one matching address. Nibble sessions remove the low half.
    pub fn exclude_address(&mut self, address: Address) -> bool {
        let logical = self.strategy.to_logical(address, false);
        self.exclude_logical(logical)
    }

    /// Removes the matching address a lookup returned
    pub fn exclude_match(&mut self, m: &SearchMatch) -> bool {
        let logical = self.strategy.logical_for(m.address, m.mem_size);
        self.exclude_logical(logical)
    }

    pub fn exclude_at_index(&mut self, index: usize) -> bool {
        match self.matching_addresses.as_mut() {
            Some(matches) if index < matches.len() => {
                matches.remove(index);
                true
            }
            _ => false,
        }
    }

    fn exclude_logical(&mut self, logical: LogicalAddress) -> bool {
        let Some(matches) = self.matching_addresses.as_mut() else {
            return false;
        };

        match matches.binary_search(&logical) {
            Ok(index) => {
                matches.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    /// Re-reads a match from live memory. Returns whether its value changed.
    pub fn update_value<P: MemoryProvider + ?Sized>(
        &self,
        m: &mut SearchMatch,
        provider: &P,
    ) -> bool {
        let bytes = provider.read_bytes(m.address, m.mem_size.byte_count());
        let value = read_raw(m.mem_size, &bytes);
        let changed = value != m.value;
        m.value = value;
        changed
    }

    /// Whether a match with its current value would survive this session's
    /// filter if it were re-derived from `previous`
    pub fn matches_filter(&self, previous: &SearchSession, m: &SearchMatch) -> bool {
        if self.filter.filter_type == FilterType::None {
            return true;
        }

        if self.strategy.is_text() {
            return self.text_matches_filter(previous, m);
        }

        let comparator = Comparator::new(self.strategy, &self.filter);
        let current = self.strategy.sample_from_raw(m.value);
        comparator.passes(current, || {
            let raw = previous.value_at(m.address, m.mem_size).map_or(0, |p| p.value);
            self.strategy.sample_from_raw(raw)
        })
    }

    fn text_matches_filter(&self, previous: &SearchSession, m: &SearchMatch) -> bool {
        let needle: &[u8] = match (self.filter.filter_type, &self.filter.value) {
            (FilterType::Constant, FilterValue::Text(text)) => text.as_bytes(),
            _ => &[],
        };
        if self.filter.filter_type == FilterType::Constant && needle.is_empty() {
            return false;
        }

        let compare_len = if needle.is_empty() {
            TEXT_COMPARE_LENGTH
        } else {
            needle.len()
        };

        let mut current = vec![0u8; compare_len];
        self.get_bytes(m.address, &mut current);
        current[0] = m.value as u8;

        if !needle.is_empty() {
            return filter::compare_text(&current, needle, compare_len, self.filter.comparison);
        }

        // as in a filter pass, the compare ends where the previous capture does
        let mut reference = vec![0u8; compare_len];
        previous.get_bytes(m.address, &mut reference);
        let count = previous.covered_len(m.address, compare_len);
        filter::compare_text(&current, &reference, count, self.filter.comparison)
    }

    /// One line describing the session
    pub fn summary(&self) -> String {
        if self.is_filtered() {
            format!(
                "Filtering for {} {}...",
                self.filter.comparison.label(),
                self.filter.describe_operand()
            )
        } else {
            format!(
                "Cleared: ({}) mode. Aware of {} RAM locations.",
                self.word_type().label(),
                self.matching_address_count()
            )
        }
    }
}

/// Printable ASCII up to the first NUL; anything else becomes U+FFFD
fn render_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| {
            if b == b' ' || b.is_ascii_graphic() {
                char::from(b)
            } else {
                char::REPLACEMENT_CHARACTER
            }
        })
        .collect()
}

//! The filter pass: compare every candidate of a session against live memory
//!
//! A pass walks the blocks of a source session, re-reads the live bytes each
//! block covers, keeps the candidates that satisfy the filter, and re-blocks
//! the survivors so the new session only holds the bytes it still needs.

use super::strategy::{Sample, WordStrategy};
use super::value::{is_zero_delta, WordValue};
use crate::core::types::{
    Address, ComparisonType, FilterType, FilterValue, LogicalAddress, SearchFilter,
};
use crate::memory::{MemoryBlock, MemoryProvider};
use tracing::{debug, trace};

/// Bytes compared by text filters that have no needle of their own
pub const TEXT_COMPARE_LENGTH: usize = 16;

/// Blocks and surviving addresses produced by a filter pass
#[derive(Debug, Default)]
pub struct FilterOutput {
    pub blocks: Vec<MemoryBlock>,
    pub matches: Vec<LogicalAddress>,
    pub padding: usize,
}

/// The part of a session a filter pass reads from
#[derive(Debug, Clone, Copy)]
pub struct FilterSource<'a> {
    pub strategy: &'static WordStrategy,
    pub blocks: &'a [MemoryBlock],
    pub padding: usize,
    pub matches: Option<&'a [LogicalAddress]>,
}

impl<'a> FilterSource<'a> {
    /// Number of bytes of a block whose addresses are candidates
    pub fn candidate_len(&self, block: &MemoryBlock) -> usize {
        block.size().saturating_sub(self.padding)
    }

    /// Candidates of one block, in ascending logical order
    pub fn candidates(&self, block: &MemoryBlock) -> Vec<LogicalAddress> {
        let start = block.address();
        let len = self.candidate_len(block) as u64;

        match self.matches {
            Some(matches) => {
                let strategy = self.strategy;
                let end = start.as_u64() + len;
                let lo = matches.partition_point(|&l| strategy.from_logical(l) < start);
                let hi = matches.partition_point(|&l| strategy.from_logical(l).as_u64() < end);
                matches[lo..hi.max(lo)].to_vec()
            }
            None => {
                let count = self.strategy.candidate_count(start, len);
                (0..count)
                    .filter_map(|i| self.strategy.nth_candidate(start, len, i))
                    .collect()
            }
        }
    }
}

/// Decides whether one candidate survives a numeric filter
#[derive(Debug, Clone)]
pub struct Comparator {
    comparison: ComparisonType,
    filter_type: FilterType,
    delta: FilterValue,
    constant: Option<Sample>,
    raw_equality: bool,
}

impl Comparator {
    pub fn new(strategy: &WordStrategy, filter: &SearchFilter) -> Self {
        let constant = (filter.filter_type == FilterType::Constant)
            .then(|| constant_sample(strategy, &filter.value));

        // equality on floats compares bit patterns, so NaN equals itself and
        // re-filtering unchanged memory is stable
        let raw_equality = strategy.is_float()
            && matches!(filter.comparison, ComparisonType::Equals | ComparisonType::NotEqualTo)
            && (constant.is_some()
                || is_zero_delta(&filter.value)
                || !filter.filter_type.requires_value());

        Comparator {
            comparison: filter.comparison,
            filter_type: filter.filter_type,
            delta: filter.value.clone(),
            constant,
            raw_equality,
        }
    }

    /// Whether a filter with no adjustment can only keep or drop every
    /// candidate of an unchanged block
    pub fn is_unadjusted_previous(&self) -> bool {
        self.constant.is_none()
            && (is_zero_delta(&self.delta) || !self.filter_type.requires_value())
    }

    pub fn comparison(&self) -> ComparisonType {
        self.comparison
    }

    /// `previous` is only evaluated for filters that compare against captured memory
    pub fn passes(&self, current: Sample, previous: impl FnOnce() -> Sample) -> bool {
        match (self.constant, self.raw_equality) {
            (Some(constant), true) => self.comparison.compare(current.raw, constant.raw),
            (Some(constant), false) => self.comparison.compare(current.value, constant.value),
            (None, true) => self.comparison.compare(current.raw, previous().raw),
            (None, false) => {
                let reference = previous().value.adjusted(self.filter_type, &self.delta);
                self.comparison.compare(current.value, reference)
            }
        }
    }
}

fn constant_sample(strategy: &WordStrategy, value: &FilterValue) -> Sample {
    if strategy.is_float() {
        let value = match value {
            FilterValue::Float(v) => *v,
            FilterValue::Integer(v) => *v as f32,
            FilterValue::Text(_) => 0.0,
        };
        Sample {
            raw: strategy.encode_float(value),
            value: WordValue::Float(value),
        }
    } else {
        let value = match value {
            FilterValue::Integer(v) => *v,
            FilterValue::Float(v) => *v as u32,
            FilterValue::Text(_) => 0,
        };
        Sample {
            raw: value,
            value: WordValue::Unsigned(value),
        }
    }
}

/// Runs one filter pass over `source`
pub fn apply_filter<P: MemoryProvider + ?Sized>(
    source: FilterSource<'_>,
    provider: &P,
    filter: &SearchFilter,
) -> FilterOutput {
    let output = if source.strategy.is_text() {
        apply_text_filter(source, provider, filter)
    } else {
        apply_numeric_filter(source, provider, filter)
    };

    debug!(
        "{} filter ({} {}): {} source blocks -> {} matches in {} blocks",
        source.strategy.word_type(),
        filter.comparison.label(),
        filter.describe_operand(),
        source.blocks.len(),
        output.matches.len(),
        output.blocks.len()
    );

    output
}

fn apply_numeric_filter<P: MemoryProvider + ?Sized>(
    source: FilterSource<'_>,
    provider: &P,
    filter: &SearchFilter,
) -> FilterOutput {
    let strategy = source.strategy;
    let comparator = Comparator::new(strategy, filter);
    let padding = strategy.padding();
    let mut output = FilterOutput {
        padding,
        ..FilterOutput::default()
    };

    let mut scratch = Vec::new();
    for block in source.blocks {
        scratch.resize(block.size(), 0);
        provider.read_memory(block.address(), &mut scratch);

        let candidates = source.candidates(block);
        let base = block.address().as_u64();
        let previous = block.bytes();

        let passing: Vec<LogicalAddress> =
            if !strategy.is_float() && comparator.is_unadjusted_previous() && scratch == previous {
                // unchanged block: every candidate compares equal to itself
                match comparator.comparison() {
                    ComparisonType::Equals
                    | ComparisonType::LessThanOrEqual
                    | ComparisonType::GreaterThanOrEqual => candidates,
                    _ => Vec::new(),
                }
            } else {
                candidates
                    .into_iter()
                    .filter(|&logical| {
                        let offset = (strategy.from_logical(logical).as_u64() - base) as usize;
                        let current = strategy.sample(&scratch[offset..], logical);
                        comparator.passes(current, || strategy.sample(&previous[offset..], logical))
                    })
                    .collect()
            };

        trace!(
            "block {} ({} bytes): {} candidates passed",
            block.address(),
            block.size(),
            passing.len()
        );

        output
            .blocks
            .extend(group_runs(strategy, &passing, &scratch, block.address(), padding));
        output.matches.extend(passing);
    }

    output
}

fn apply_text_filter<P: MemoryProvider + ?Sized>(
    source: FilterSource<'_>,
    provider: &P,
    filter: &SearchFilter,
) -> FilterOutput {
    let strategy = source.strategy;
    let needle: &[u8] = match (filter.filter_type, &filter.value) {
        (FilterType::Constant, FilterValue::Text(text)) => text.as_bytes(),
        _ => &[],
    };

    // an empty constant can't match anything
    if filter.filter_type == FilterType::Constant && needle.is_empty() {
        return FilterOutput::default();
    }

    let compare_len = if needle.is_empty() {
        TEXT_COMPARE_LENGTH
    } else {
        needle.len()
    };
    let padding = compare_len - 1;
    let mut output = FilterOutput {
        padding,
        ..FilterOutput::default()
    };

    let mut scratch = Vec::new();
    for block in source.blocks {
        let candidate_len = source.candidate_len(block);
        scratch.resize(candidate_len + padding, 0);
        provider.read_memory(block.address(), &mut scratch);

        let base = block.address().as_u64();
        let previous = block.bytes();
        let passing: Vec<LogicalAddress> = source
            .candidates(block)
            .into_iter()
            .filter(|&logical| {
                let offset = (logical - base) as usize;
                if !needle.is_empty() {
                    return compare_text(&scratch[offset..], needle, compare_len, filter.comparison);
                }

                // only the bytes the block captured are known; both sides end there
                let reference = previous.get(offset..).unwrap_or(&[]);
                let count = compare_len.min(reference.len());
                compare_text(&scratch[offset..], reference, count, filter.comparison)
            })
            .collect();

        trace!(
            "text block {} ({} bytes): {} candidates passed",
            block.address(),
            block.size(),
            passing.len()
        );

        output
            .blocks
            .extend(group_runs(strategy, &passing, &scratch, block.address(), padding));
        output.matches.extend(passing);
    }

    output
}

/// Byte-wise comparison of up to `count` bytes. Stops early when both sides
/// hold a terminator at the same position; bytes past either slice read as zero.
pub fn compare_text(left: &[u8], right: &[u8], count: usize, comparison: ComparisonType) -> bool {
    for i in 0..count {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);

        if l != r {
            return comparison.compare(l, r);
        }
        if l == 0 {
            break;
        }
    }

    comparison.accepts_equal()
}

/// Splits sorted matches into runs whose blocks would touch or overlap, and
/// captures one block per run from `memory` (which starts at `memory_base`).
pub fn group_runs(
    strategy: &WordStrategy,
    matches: &[LogicalAddress],
    memory: &[u8],
    memory_base: Address,
    padding: usize,
) -> Vec<MemoryBlock> {
    let mut blocks = Vec::new();
    let mut index = 0;

    while index < matches.len() {
        let run = &matches[index..index + run_length(strategy, &matches[index..], padding)];
        index += run.len();

        let first = strategy.from_logical(run[0]).as_u64();
        let last = strategy.from_logical(run[run.len() - 1]).as_u64();
        let offset = (first - memory_base.as_u64()) as usize;
        let end = ((last - memory_base.as_u64()) as usize + 1 + padding).min(memory.len());
        let bytes = memory.get(offset..end).map(<[u8]>::to_vec).unwrap_or_default();
        blocks.push(MemoryBlock::new(Address::new(first), bytes));
    }

    blocks
}

/// Number of leading matches that fall into one block: each starts at most
/// `padding` bytes past the end of the previous word byte
pub fn run_length(strategy: &WordStrategy, matches: &[LogicalAddress], padding: usize) -> usize {
    let Some(&head) = matches.first() else {
        return 0;
    };

    let mut last = strategy.from_logical(head).as_u64();
    let mut count = 1;
    for &logical in &matches[1..] {
        let next = strategy.from_logical(logical).as_u64();
        if next - last > 1 + padding as u64 {
            break;
        }
        last = next;
        count += 1;
    }
    count
}

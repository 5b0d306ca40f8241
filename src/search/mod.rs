//! The search engine: word strategies, filter passes and the sessions they produce
//!
//! A search starts with [`SearchSession::fresh`], which captures a range of
//! memory, and narrows with repeated [`SearchSession::filtered`] calls that
//! compare the captured bytes against live memory.

pub mod filter;
pub mod merge;
pub mod session;
pub mod strategy;
pub mod value;

pub use session::{SearchSession, MAX_BLOCK_SIZE};
pub use strategy::{format_raw, read_raw, write_raw, WordStrategy};
pub use value::WordValue;

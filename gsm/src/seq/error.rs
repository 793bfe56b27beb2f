//! Error types shared by every mining engine.
//!
//! Configuration errors are reported when parameters are validated, data
//! errors when a transaction is ingested, and sink failures abort the running
//! `mine` call. Nothing is retried inside the engines.

use thiserror::Error;

use super::session::Phase;
use super::Item;

/// Failures of the posting-list decoder.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("posting list ended in the middle of a value at byte {0}")]
    Truncated(usize),

    #[error("expected a value at byte {0} but found a posting separator")]
    UnexpectedSeparator(usize),

    #[error("expected a value at byte {0} but the posting list is exhausted")]
    UnexpectedEnd(usize),

    #[error("posting list ends with a dangling separator at byte {0}")]
    DanglingSeparator(usize),

    #[error("value starting at byte {0} does not fit into 32 bits")]
    Overflow(usize),

    #[error("a posting must start with a transaction id followed by at least one position (byte {0})")]
    EmptyPosting(usize),
}

/// Unified error type for the public mining API.
#[derive(Debug, Error)]
pub enum MiningError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: i64,
        reason: &'static str,
    },

    #[error("unknown engine `{0}` (expected dfs, bfs, psm or psm-index)")]
    UnknownEngine(String),

    #[error("invalid pivot range [{begin}, {end}]")]
    InvalidPivotRange { begin: Item, end: Item },

    #[error("item {item} has no taxonomy entry (largest known item is {max})")]
    UnknownItem { item: Item, max: Item },

    #[error("item {item} lies above the pivot range end {end}")]
    ItemAbovePivotRange { item: Item, end: Item },

    #[error("taxonomy parent of item {item} is {parent}, which is out of range")]
    InvalidParent { item: Item, parent: Item },

    #[error("taxonomy contains a cycle through item {0}")]
    TaxonomyCycle(Item),

    #[error("transaction weight must be at least 1, got {0}")]
    InvalidWeight(u32),

    #[error("transaction spans {0} positions, more than a posting list can address")]
    TransactionTooLong(u64),

    #[error("cannot {operation} while the engine is {phase:?}")]
    InvalidPhase { operation: &'static str, phase: Phase },

    #[error("malformed posting list: {0}")]
    Codec(#[from] CodecError),

    #[error("line {line}: cannot parse `{token}` as a transaction entry")]
    Parse { line: usize, token: String },

    #[error("result sink failed: {0}")]
    Sink(#[source] std::io::Error),

    #[error("failed to read transactions: {0}")]
    Io(#[source] std::io::Error),
}

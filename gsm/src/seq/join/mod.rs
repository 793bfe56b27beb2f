//! Level-wise mining by joining overlapping sequences.

pub mod level;
pub mod mining;

pub use level::{extend_level, join_postings};
pub use mining::JoinMiner;

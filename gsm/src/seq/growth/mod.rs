//! Depth-first prefix growth.

pub mod mining;

pub use mining::GrowthMiner;

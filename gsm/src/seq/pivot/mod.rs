//! Pivot-anchored growth.
//!
//! Every pattern is attributed to its pivot, the largest item it contains,
//! anchored at the rightmost occurrence of that item. Right extensions only
//! accept items strictly smaller than the pivot and left extensions items up
//! to and including the pivot, so each pattern is grown exactly once and
//! from exactly one pivot.

pub mod indexed;
pub mod mining;
pub mod scan;
pub mod tables;

pub use indexed::IndexedPivotMiner;
pub use mining::PivotMiner;

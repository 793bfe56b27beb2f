pub mod index;
pub mod posting;
pub mod storage;
pub mod window;

pub use index::{Anchor, OccurrenceIndex, Span};
pub use posting::{Posting, PostingCursor, PostingList};
pub use storage::{SequenceLevel, TransactionStore};
pub use window::{left_of, right_of};

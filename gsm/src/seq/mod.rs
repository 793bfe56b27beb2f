pub mod config;
pub mod error;
pub mod growth;
pub mod join;
pub mod parallel;
pub mod pivot;
pub mod session;
pub mod sink;
pub mod taxonomy;
pub mod utils;


/// Item identifier. 0 is reserved and never names a real item.
pub type Item = u32;

pub use config::{EngineKind, MiningConfig, MiningParams, PivotRange};
pub use error::{CodecError, MiningError};
pub use growth::GrowthMiner;
pub use join::JoinMiner;
pub use parallel::mine_partitioned;
pub use pivot::{IndexedPivotMiner, PivotMiner};
pub use session::{build_miner, mine_sequences, scan_database, MiningSession, Phase, SequenceMiner};
pub use sink::{CollectSink, CountingSink, MiningStats, ResultSink, TextSink};
pub use taxonomy::{ParentSource, Taxonomy};
pub use utils::{Posting, PostingCursor, PostingList};

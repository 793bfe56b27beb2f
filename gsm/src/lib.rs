pub mod seq;

#[cfg(feature = "python")]
mod python;

pub use seq::{
    mine_partitioned, mine_sequences, EngineKind, Item, MiningConfig, MiningError, MiningParams,
    MiningSession, PivotRange, ResultSink, SequenceMiner, Taxonomy,
};

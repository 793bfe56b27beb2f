pub mod processor;
pub mod state;

pub use processor::{build_miner, mine_sequences, scan_database, MiningSession, SequenceMiner};
pub use state::{EngineCore, Phase, Retain};

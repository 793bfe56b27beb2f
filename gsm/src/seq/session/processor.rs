use std::io::BufRead;
use std::sync::Arc;

use super::state::Phase;
use crate::seq::config::{EngineKind, MiningConfig, MiningParams, PivotRange};
use crate::seq::error::MiningError;
use crate::seq::growth::GrowthMiner;
use crate::seq::join::JoinMiner;
use crate::seq::pivot::{IndexedPivotMiner, PivotMiner};
use crate::seq::sink::{CollectSink, MiningStats, ResultSink};
use crate::seq::taxonomy::Taxonomy;
use crate::seq::Item;

/// Common lifecycle of every mining engine.
///
/// `set_parameters` → `initialize` / `initialize_range` → `add_transaction`*
/// → `mine`. Mining consumes the ingested data; the engine has to be
/// initialized again before it accepts new transactions.
pub trait SequenceMiner {
    fn set_parameters(&mut self, params: MiningParams, taxonomy: Arc<Taxonomy>);

    /// Prepares for ingestion; every pattern qualifies for emission.
    fn initialize(&mut self) {
        self.initialize_range(PivotRange::all());
    }

    /// Prepares for ingestion; only patterns containing an item of `range`
    /// are emitted. Transactions may not contain items above its end, and
    /// ancestors above it never take part in a pattern.
    fn initialize_range(&mut self, range: PivotRange);

    fn add_transaction(&mut self, entries: &[i32], weight: u32) -> Result<(), MiningError>;

    /// Writes every accepted pattern to `sink` and clears the engine, whether
    /// or not mining succeeds.
    fn mine(&mut self, sink: &mut dyn ResultSink) -> Result<MiningStats, MiningError>;

    fn clear(&mut self);

    fn phase(&self) -> Phase;

    /// Transactions ingested since the last `initialize`.
    fn transaction_count(&self) -> usize;
}

/// Builds an engine of the given kind, ready for `initialize`.
pub fn build_miner(
    kind: EngineKind,
    params: MiningParams,
    taxonomy: Arc<Taxonomy>,
) -> Box<dyn SequenceMiner + Send> {
    match kind {
        EngineKind::Dfs => Box::new(GrowthMiner::new(params, taxonomy)),
        EngineKind::Bfs => Box::new(JoinMiner::new(params, taxonomy)),
        EngineKind::Pivot => Box::new(PivotMiner::new(params, taxonomy)),
        EngineKind::IndexedPivot => Box::new(IndexedPivotMiner::new(params, taxonomy)),
    }
}

/// Reads one transaction per line: whitespace-separated integers, negative
/// numbers being gaps. Blank lines are skipped and every transaction has
/// weight 1. Returns the number of transactions ingested.
pub fn scan_database<M, R>(miner: &mut M, reader: R) -> Result<usize, MiningError>
where
    M: SequenceMiner + ?Sized,
    R: BufRead,
{
    let mut entries = Vec::new();
    let mut count = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(MiningError::Io)?;
        entries.clear();
        for token in line.split_whitespace() {
            let entry = token.parse::<i32>().map_err(|_| MiningError::Parse {
                line: index + 1,
                token: token.to_string(),
            })?;
            entries.push(entry);
        }
        if entries.is_empty() {
            continue;
        }
        miner.add_transaction(&entries, 1)?;
        count += 1;
    }
    log::debug!("scanned {} transactions", count);
    Ok(count)
}

/// Mines an in-memory database of `(entries, weight)` transactions in one
/// call.
pub fn mine_sequences(
    transactions: &[(Vec<i32>, u32)],
    config: MiningConfig,
    taxonomy: Arc<Taxonomy>,
) -> Result<Vec<(Vec<Item>, u64)>, MiningError> {
    let mut session = MiningSession::new(config, taxonomy);
    for (entries, weight) in transactions {
        session.add_transaction(entries, *weight)?;
    }
    session.mine_to_vec()
}

/// Facade over the engines: picks one by [`EngineKind`] and keeps it ready
/// for ingestion across `mine` calls.
pub struct MiningSession {
    config: MiningConfig,
    taxonomy: Arc<Taxonomy>,
    miner: Box<dyn SequenceMiner + Send>,
}

impl MiningSession {
    pub fn new(config: MiningConfig, taxonomy: Arc<Taxonomy>) -> Self {
        let mut miner = build_miner(config.engine, config.params, taxonomy.clone());
        miner.initialize_range(config.pivot_range);
        Self {
            config,
            taxonomy,
            miner,
        }
    }

    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    /// Transactions ingested since the last `mine`.
    pub fn pending_transactions(&self) -> usize {
        self.miner.transaction_count()
    }

    pub fn add_transaction(&mut self, entries: &[i32], weight: u32) -> Result<(), MiningError> {
        self.miner.add_transaction(entries, weight)
    }

    /// Lines before a failing one stay ingested.
    pub fn scan_database<R: BufRead>(&mut self, reader: R) -> Result<usize, MiningError> {
        scan_database(self.miner.as_mut(), reader)
    }

    /// Mines the ingested transactions and prepares the session for the next
    /// batch.
    pub fn mine(&mut self, sink: &mut dyn ResultSink) -> Result<MiningStats, MiningError> {
        log::debug!(
            "mining {} transactions with the {} engine",
            self.miner.transaction_count(),
            self.config.engine
        );
        let result = self.miner.mine(sink);
        self.miner.initialize_range(self.config.pivot_range);
        let stats = result?;
        log::info!(
            "{} engine emitted {} patterns ({} candidates)",
            self.config.engine,
            stats.patterns,
            stats.candidates
        );
        Ok(stats)
    }

    pub fn mine_to_vec(&mut self) -> Result<Vec<(Vec<Item>, u64)>, MiningError> {
        let mut sink = CollectSink::new();
        self.mine(&mut sink)?;
        Ok(sink.into_patterns())
    }

    /// Drops ingested transactions without mining.
    pub fn reset(&mut self) {
        self.miner.initialize_range(self.config.pivot_range);
    }
}

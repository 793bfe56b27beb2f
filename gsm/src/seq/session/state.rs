use std::sync::Arc;

use crate::seq::config::{MiningParams, PivotRange};
use crate::seq::error::MiningError;
use crate::seq::taxonomy::Taxonomy;
use crate::seq::utils::TransactionStore;
use crate::seq::Item;

/// Lifecycle phase of an engine.
///
/// `Configured --initialize--> Ingesting --mine--> Configured`. Changing the
/// parameters or clearing the engine also returns it to `Configured`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Parameters are set; `initialize` must run before transactions arrive.
    Configured,
    /// Accepting transactions; ready to mine.
    Ingesting,
}

/// Whether an engine keeps the transaction entries for later scans or only
/// their weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retain {
    Entries,
    WeightOnly,
}

/// State shared by all engines: parameters, taxonomy, pivot range, lifecycle
/// and the owned transactions.
#[derive(Debug)]
pub struct EngineCore {
    pub params: MiningParams,
    pub taxonomy: Arc<Taxonomy>,
    pub range: PivotRange,
    pub transactions: TransactionStore,
    phase: Phase,
}

impl EngineCore {
    pub fn new(params: MiningParams, taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            params,
            taxonomy,
            range: PivotRange::all(),
            transactions: TransactionStore::new(),
            phase: Phase::Configured,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_parameters(&mut self, params: MiningParams, taxonomy: Arc<Taxonomy>) {
        self.params = params;
        self.taxonomy = taxonomy;
        self.reset();
    }

    pub fn initialize(&mut self, range: PivotRange) {
        self.reset();
        self.range = range;
        self.phase = Phase::Ingesting;
        log::debug!(
            "initialized for pivots [{}, {}] with {:?}",
            range.begin(),
            range.end(),
            self.params
        );
    }

    /// Drops all transactions and requires a new `initialize`.
    pub fn reset(&mut self) {
        self.transactions.clear();
        self.phase = Phase::Configured;
    }

    pub fn require_ingesting(&self, operation: &'static str) -> Result<(), MiningError> {
        if self.phase != Phase::Ingesting {
            return Err(MiningError::InvalidPhase {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }

    /// Validates a transaction and stores it. Returns the transaction id.
    pub fn ingest(
        &mut self,
        entries: &[i32],
        weight: u32,
        retain: Retain,
    ) -> Result<u32, MiningError> {
        self.require_ingesting("add a transaction")?;
        if weight < 1 {
            return Err(MiningError::InvalidWeight(weight));
        }

        let mut span: u64 = 0;
        for &entry in entries {
            if entry < 0 {
                span += u64::from(entry.unsigned_abs());
                continue;
            }
            span += 1;
            let item = entry as Item;
            if !self.taxonomy.contains(item) {
                return Err(MiningError::UnknownItem {
                    item,
                    max: self.taxonomy.max_item(),
                });
            }
            if item > self.range.end() {
                return Err(MiningError::ItemAbovePivotRange {
                    item,
                    end: self.range.end(),
                });
            }
        }
        if span > u64::from(u32::MAX) || self.transactions.len() >= u32::MAX as usize {
            return Err(MiningError::TransactionTooLong(span));
        }

        let stored = match retain {
            Retain::Entries => entries,
            Retain::WeightOnly => &[],
        };
        Ok(self.transactions.push(stored, weight))
    }
}

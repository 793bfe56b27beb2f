use std::collections::HashSet;
use std::sync::Arc;

use super::scan::{PivotIndex, Scanner};
use crate::seq::config::{MiningParams, PivotRange};
use crate::seq::error::MiningError;
use crate::seq::session::{EngineCore, Phase, Retain, SequenceMiner};
use crate::seq::sink::{Emitter, MiningStats, ResultSink};
use crate::seq::taxonomy::Taxonomy;
use crate::seq::utils::PostingList;
use crate::seq::Item;

/// Pivot-anchored miner without memoization.
///
/// For each frequent pivot in the range the pivot singleton is emitted, then
/// its right expansion tree, then every left expansion followed by its own
/// right expansion tree and deeper left expansions.
pub struct PivotMiner {
    core: EngineCore,
    index: PivotIndex,
}

impl PivotMiner {
    pub fn new(params: MiningParams, taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            core: EngineCore::new(params, taxonomy),
            index: PivotIndex::new(),
        }
    }

    fn run(&mut self, emitter: &mut Emitter<'_>) -> Result<(), MiningError> {
        let params = self.core.params;
        let (frequent, pivots) = self.index.finish(params.sigma());
        let scanner = Scanner {
            transactions: &self.core.transactions,
            taxonomy: &self.core.taxonomy,
            gamma: params.gamma(),
        };

        for (pivot, support, postings) in pivots.into_frequent(params.sigma()) {
            log::debug!("pivot {} (support {})", pivot, support);
            emitter.emit(&[pivot], support)?;
            let mut search = PivotSearch {
                scanner,
                params,
                frequent: &frequent,
                pivot,
                emitter: &mut *emitter,
            };
            let mut pattern = vec![pivot];
            search.grow_right(&mut pattern, &postings)?;
            search.grow_left(&pattern, &postings)?;
        }
        Ok(())
    }
}

struct PivotSearch<'a, 'e, 's> {
    scanner: Scanner<'a>,
    params: MiningParams,
    frequent: &'a HashSet<Item>,
    pivot: Item,
    emitter: &'e mut Emitter<'s>,
}

impl PivotSearch<'_, '_, '_> {
    fn grow_right(&mut self, pattern: &mut Vec<Item>, postings: &PostingList) -> Result<(), MiningError> {
        if pattern.len() >= self.params.max_len() {
            return Ok(());
        }
        let (pivot, frequent) = (self.pivot, self.frequent);
        let local = self
            .scanner
            .right(postings, |item| item < pivot && frequent.contains(&item))?;
        self.emitter.examined(local.len());

        for (item, support, child) in local.into_frequent(self.params.sigma()) {
            pattern.push(item);
            self.emitter.emit(pattern, support)?;
            self.grow_right(pattern, &child)?;
            pattern.pop();
        }
        Ok(())
    }

    fn grow_left(&mut self, pattern: &[Item], postings: &PostingList) -> Result<(), MiningError> {
        if pattern.len() >= self.params.max_len() {
            return Ok(());
        }
        let (pivot, frequent) = (self.pivot, self.frequent);
        let local = self
            .scanner
            .left(postings, |item| item <= pivot && frequent.contains(&item))?;
        self.emitter.examined(local.len());

        for (item, support, child) in local.into_frequent(self.params.sigma()) {
            let mut extended = Vec::with_capacity(pattern.len() + 1);
            extended.push(item);
            extended.extend_from_slice(pattern);
            self.emitter.emit(&extended, support)?;
            self.grow_right(&mut extended, &child)?;
            self.grow_left(&extended, &child)?;
        }
        Ok(())
    }
}

impl SequenceMiner for PivotMiner {
    fn set_parameters(&mut self, params: MiningParams, taxonomy: Arc<Taxonomy>) {
        self.core.set_parameters(params, taxonomy);
        self.index.clear();
    }

    fn initialize_range(&mut self, range: PivotRange) {
        self.core.initialize(range);
        self.index.clear();
    }

    fn add_transaction(&mut self, entries: &[i32], weight: u32) -> Result<(), MiningError> {
        let tid = self.core.ingest(entries, weight, Retain::Entries)?;
        self.index.add(
            &self.core.taxonomy,
            self.core.range,
            tid,
            u64::from(weight),
            entries,
        );
        Ok(())
    }

    fn mine(&mut self, sink: &mut dyn ResultSink) -> Result<MiningStats, MiningError> {
        self.core.require_ingesting("mine")?;
        let mut emitter = Emitter::new(sink);
        let result = self.run(&mut emitter);
        self.clear();
        result.map(|()| emitter.stats())
    }

    fn clear(&mut self) {
        self.core.reset();
        self.index.clear();
    }

    fn phase(&self) -> Phase {
        self.core.phase()
    }

    fn transaction_count(&self) -> usize {
        self.core.transactions.len()
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use super::scan::{PivotIndex, Scanner};
use super::tables::MemoTables;
use crate::seq::config::{MiningParams, PivotRange};
use crate::seq::error::MiningError;
use crate::seq::session::{EngineCore, Phase, Retain, SequenceMiner};
use crate::seq::sink::{Emitter, MiningStats, ResultSink};
use crate::seq::taxonomy::Taxonomy;
use crate::seq::utils::PostingList;
use crate::seq::Item;

/// Pivot-anchored miner that remembers, per left level and right depth,
/// which right extensions turned out frequent.
///
/// A pattern `x·P·Q` (left item `x`, `P` the pattern grown so far, `Q` its
/// `d` right items) can only be extended to the right by an item `a` if
/// `P·Q·a` is frequent, which the previous left level has already
/// established. The right expansion after a left extension therefore skips
/// patterns whose last item never had an extension at the previous level and
/// only considers items confirmed there.
pub struct IndexedPivotMiner {
    core: EngineCore,
    index: PivotIndex,
}

impl IndexedPivotMiner {
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
        let mut search = IndexedSearch {
            scanner,
            params,
            frequent: &frequent,
            pivot: 0,
            tables: MemoTables::new(),
            emitter,
        };

        for (pivot, support, postings) in pivots.into_frequent(params.sigma()) {
            log::debug!("pivot {} (support {})", pivot, support);
            search.pivot = pivot;
            search.tables.clear();
            search.emitter.emit(&[pivot], support)?;
            let mut pattern = vec![pivot];
            search.grow_right(&mut pattern, &postings, 0, 0)?;
            search.grow_left(&pattern, &postings, 0)?;
        }
        Ok(())
    }
}

struct IndexedSearch<'a, 'e, 's> {
    scanner: Scanner<'a>,
    params: MiningParams,
    frequent: &'a HashSet<Item>,
    pivot: Item,
    tables: MemoTables,
    emitter: &'e mut Emitter<'s>,
}

impl IndexedSearch<'_, '_, '_> {
    /// Right expansion of a pattern with `level` left items and `depth` right
    /// items.
    fn grow_right(
        &mut self,
        pattern: &mut Vec<Item>,
        postings: &PostingList,
        level: usize,
        depth: usize,
    ) -> Result<(), MiningError> {
        if pattern.len() >= self.params.max_len() {
            return Ok(());
        }
        let Some(&last) = pattern.last() else {
            return Ok(());
        };
        if level > 0 && !self.tables.was_extended(level - 1, depth, last) {
            return Ok(());
        }

        let (pivot, frequent, tables) = (self.pivot, self.frequent, &self.tables);
        let local = self.scanner.right(postings, |item| {
            item < pivot
                && if level == 0 {
                    frequent.contains(&item)
                } else {
                    tables.is_confirmed(level - 1, depth, item)
                }
        })?;
        self.emitter.examined(local.len());

        let mut extended = false;
        for (item, support, child) in local.into_frequent(self.params.sigma()) {
            extended = true;
            self.tables.confirm_right(level, depth, item);
            pattern.push(item);
            self.emitter.emit(pattern, support)?;
            self.grow_right(pattern, &child, level, depth + 1)?;
            pattern.pop();
        }
        if extended {
            self.tables.mark_extended(level, depth, last);
        }
        Ok(())
    }

    fn grow_left(
        &mut self,
        pattern: &[Item],
        postings: &PostingList,
        level: usize,
    ) -> Result<(), MiningError> {
        if pattern.len() >= self.params.max_len() {
            return Ok(());
        }
        let (pivot, frequent) = (self.pivot, self.frequent);
        let local = self
            .scanner
            .left(postings, |item| item <= pivot && frequent.contains(&item))?;
        self.emitter.examined(local.len());

        let child_level = level + 1;
        for (item, support, child) in local.into_frequent(self.params.sigma()) {
            let mut extended = Vec::with_capacity(pattern.len() + 1);
            extended.push(item);
            extended.extend_from_slice(pattern);
            self.emitter.emit(&extended, support)?;

            self.tables.clear_level(child_level);
            debug_assert!(self.tables.is_clear_from(child_level));
            self.grow_right(&mut extended, &child, child_level, 0)?;
            self.grow_left(&extended, &child, child_level)?;
        }
        self.tables.clear_level(child_level);
        Ok(())
    }
}

impl SequenceMiner for IndexedPivotMiner {
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

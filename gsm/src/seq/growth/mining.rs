use std::collections::HashSet;
use std::mem;
use std::sync::Arc;

use crate::seq::config::{MiningParams, PivotRange};
use crate::seq::error::{CodecError, MiningError};
use crate::seq::session::{EngineCore, Phase, Retain, SequenceMiner};
use crate::seq::sink::{Emitter, MiningStats, ResultSink};
use crate::seq::taxonomy::Taxonomy;
use crate::seq::utils::{right_of, OccurrenceIndex, PostingList};
use crate::seq::Item;

/// Depth-first miner growing patterns to the right.
///
/// Ingestion builds a global index item → (support, postings) that records
/// every item together with all of its ancestors at the same position.
/// Mining seeds one recursion per frequent item and, at every step, scans the
/// right neighbourhood of each occurrence of the current prefix.
pub struct GrowthMiner {
    core: EngineCore,
    items: OccurrenceIndex<Item, u32>,
}

impl GrowthMiner {
    pub fn new(params: MiningParams, taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            core: EngineCore::new(params, taxonomy),
            items: OccurrenceIndex::new(),
        }
    }

    fn run(&mut self, emitter: &mut Emitter<'_>) -> Result<(), MiningError> {
        let sigma = self.core.params.sigma();
        let items = mem::take(&mut self.items);
        let frequent: HashSet<Item> = items
            .supports()
            .filter(|&(_, support)| support >= sigma)
            .map(|(item, _)| item)
            .collect();
        log::debug!(
            "{} of {} items are frequent",
            frequent.len(),
            items.len()
        );

        let mut search = PrefixSearch {
            core: &self.core,
            frequent: &frequent,
            emitter,
        };
        for (item, support, postings) in items.into_frequent(sigma) {
            let has_pivot = self.core.range.contains(item);
            let mut prefix = vec![item];
            if has_pivot {
                search.emitter.emit(&prefix, support)?;
            }
            search.grow(&mut prefix, &postings, has_pivot)?;
        }
        Ok(())
    }
}

struct PrefixSearch<'a, 'e, 's> {
    core: &'a EngineCore,
    frequent: &'a HashSet<Item>,
    emitter: &'e mut Emitter<'s>,
}

impl PrefixSearch<'_, '_, '_> {
    fn grow(
        &mut self,
        prefix: &mut Vec<Item>,
        postings: &PostingList,
        has_pivot: bool,
    ) -> Result<(), MiningError> {
        let core = self.core;
        let params = &core.params;
        if prefix.len() >= params.max_len() {
            return Ok(());
        }

        let transactions = &core.transactions;
        let taxonomy = &*core.taxonomy;
        let frequent = self.frequent;
        let gamma = params.gamma();
        let end = core.range.end();
        let mut local: OccurrenceIndex<Item, u32> = OccurrenceIndex::new();

        postings.try_for_each_posting(|tid, cursor| -> Result<(), CodecError> {
            let entries = transactions.get(tid);
            let weight = transactions.weight(tid);
            while cursor.has_next_value() {
                let position = cursor.next_value()? as usize;
                for (index, item) in right_of(entries, position, gamma) {
                    for candidate in taxonomy.generalizations_up_to(item, end) {
                        if frequent.contains(&candidate) {
                            local.add(candidate, tid, weight, index as u32);
                        }
                    }
                }
            }
            Ok(())
        })?;

        self.emitter.examined(local.len());
        for (item, support, child) in local.into_frequent(params.sigma()) {
            prefix.push(item);
            let contains_pivot = has_pivot || core.range.contains(item);
            if contains_pivot {
                self.emitter.emit(prefix, support)?;
            }
            self.grow(prefix, &child, contains_pivot)?;
            prefix.pop();
        }
        Ok(())
    }
}

impl SequenceMiner for GrowthMiner {
    fn set_parameters(&mut self, params: MiningParams, taxonomy: Arc<Taxonomy>) {
        self.core.set_parameters(params, taxonomy);
        self.items.clear();
    }

    fn initialize_range(&mut self, range: PivotRange) {
        self.core.initialize(range);
        self.items.clear();
    }

    fn add_transaction(&mut self, entries: &[i32], weight: u32) -> Result<(), MiningError> {
        let tid = self.core.ingest(entries, weight, Retain::Entries)?;
        let weight = u64::from(weight);
        let taxonomy = &*self.core.taxonomy;
        let end = self.core.range.end();
        for (position, &entry) in entries.iter().enumerate() {
            if entry < 0 {
                continue;
            }
            for item in taxonomy.generalizations_up_to(entry as Item, end) {
                self.items.add(item, tid, weight, position as u32);
            }
        }
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
        self.items.clear();
    }

    fn phase(&self) -> Phase {
        self.core.phase()
    }

    fn transaction_count(&self) -> usize {
        self.core.transactions.len()
    }
}

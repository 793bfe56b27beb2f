use std::collections::{BTreeMap, HashSet};
use std::mem;
use std::sync::Arc;

use super::level::extend_level;
use crate::seq::config::{MiningParams, PivotRange};
use crate::seq::error::MiningError;
use crate::seq::session::{EngineCore, Phase, Retain, SequenceMiner};
use crate::seq::sink::{Emitter, MiningStats, ResultSink};
use crate::seq::taxonomy::Taxonomy;
use crate::seq::utils::{right_of, OccurrenceIndex, SequenceLevel};
use crate::seq::Item;

/// Level-wise miner.
///
/// Singletons and all gap-bounded pairs (with every generalization of either
/// side) are counted during ingestion; longer sequences are produced by
/// joining the previous level with itself. Positions are expanded: a gap
/// entry `-g` advances the position by `g`, so the distance between two start
/// positions is the number of items between them in the original sequence.
/// Transactions themselves are not kept, only their weights.
pub struct JoinMiner {
    core: EngineCore,
    singletons: BTreeMap<Item, u64>,
    pairs: OccurrenceIndex<(Item, Item), u32>,
    seen: HashSet<Item>,
}

impl JoinMiner {
    pub fn new(params: MiningParams, taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            core: EngineCore::new(params, taxonomy),
            singletons: BTreeMap::new(),
            pairs: OccurrenceIndex::new(),
            seen: HashSet::new(),
        }
    }

    fn run(&mut self, emitter: &mut Emitter<'_>) -> Result<(), MiningError> {
        let params = self.core.params;
        let range = self.core.range;
        let sigma = params.sigma();

        for (item, support) in mem::take(&mut self.singletons) {
            if support >= sigma && range.contains(item) {
                emitter.emit(&[item], support)?;
            }
        }

        let pairs = mem::take(&mut self.pairs);
        if params.lambda() < 2 {
            return Ok(());
        }
        emitter.examined(pairs.len());
        let mut level = SequenceLevel::new(2);
        for ((first, second), support, postings) in pairs.into_frequent(sigma) {
            level.push_full(&[first, second], support, postings);
        }

        loop {
            log::debug!(
                "level {}: {} frequent sequences",
                level.sequence_len,
                level.len()
            );
            emit_level(&level, range, emitter)?;
            if level.is_empty() || level.sequence_len >= params.max_len() {
                return Ok(());
            }
            level = extend_level(&level, params.gamma(), sigma, &self.core.transactions)?;
        }
    }
}

fn emit_level(
    level: &SequenceLevel,
    range: PivotRange,
    emitter: &mut Emitter<'_>,
) -> Result<(), MiningError> {
    let mut sequence = Vec::with_capacity(level.sequence_len);
    for idx in 0..level.len() {
        level.write_sequence(idx, &mut sequence);
        if sequence.iter().any(|&item| range.contains(item)) {
            emitter.emit(&sequence, level.support(idx))?;
        }
    }
    Ok(())
}

impl SequenceMiner for JoinMiner {
    fn set_parameters(&mut self, params: MiningParams, taxonomy: Arc<Taxonomy>) {
        self.core.set_parameters(params, taxonomy);
        self.clear();
    }

    fn initialize_range(&mut self, range: PivotRange) {
        self.core.initialize(range);
        self.singletons.clear();
        self.pairs.clear();
    }

    fn add_transaction(&mut self, entries: &[i32], weight: u32) -> Result<(), MiningError> {
        let tid = self.core.ingest(entries, weight, Retain::WeightOnly)?;
        let weight = u64::from(weight);
        let taxonomy = &*self.core.taxonomy;
        let end = self.core.range.end();

        self.seen.clear();
        for &entry in entries.iter().filter(|&&entry| entry >= 0) {
            self.seen.extend(taxonomy.generalizations_up_to(entry as Item, end));
        }
        for &item in &self.seen {
            *self.singletons.entry(item).or_insert(0) += weight;
        }

        if self.core.params.lambda() < 2 {
            return Ok(());
        }
        let gamma = self.core.params.gamma();
        let mut position: u32 = 0;
        for (index, &entry) in entries.iter().enumerate() {
            if entry < 0 {
                position += entry.unsigned_abs();
                continue;
            }
            for (_, next) in right_of(entries, index, gamma) {
                for first in taxonomy.generalizations_up_to(entry as Item, end) {
                    for second in taxonomy.generalizations_up_to(next, end) {
                        self.pairs.add((first, second), tid, weight, position);
                    }
                }
            }
            position += 1;
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
        self.singletons.clear();
        self.pairs.clear();
    }

    fn phase(&self) -> Phase {
        self.core.phase()
    }

    fn transaction_count(&self) -> usize {
        self.core.transactions.len()
    }
}

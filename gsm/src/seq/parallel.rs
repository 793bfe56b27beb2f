//! In-process pivot partitioning.
//!
//! Every pivot gets its own indexed pivot miner fed with the transactions
//! that contain the pivot (directly or through a descendant), projected so
//! that no item exceeds the pivot. The miners run on the rayon thread pool
//! and their outputs are concatenated in ascending pivot order.

use std::collections::BTreeSet;
use std::sync::Arc;

use rayon::prelude::*;

use super::config::{MiningParams, PivotRange};
use super::error::MiningError;
use super::pivot::IndexedPivotMiner;
use super::session::SequenceMiner;
use super::sink::CollectSink;
use super::taxonomy::Taxonomy;
use super::Item;

/// Rewrites `entries` for the partition of `pivot` into `out`.
///
/// Items above the pivot are replaced by their nearest generalization not
/// above it, or by a one-item gap when there is none; adjacent gaps are
/// merged. Returns whether the transaction contains the pivot.
pub fn project_transaction(
    entries: &[i32],
    taxonomy: &Taxonomy,
    pivot: Item,
    out: &mut Vec<i32>,
) -> bool {
    out.clear();
    let mut contains_pivot = false;
    for &entry in entries {
        if entry < 0 {
            push_gap(out, entry);
            continue;
        }
        let item = entry as Item;
        contains_pivot |= taxonomy.is_generalization_of(pivot, item);
        match taxonomy.generalizations(item).find(|&g| g <= pivot) {
            Some(g) => out.push(g as i32),
            None => push_gap(out, -1),
        }
    }
    contains_pivot
}

fn push_gap(out: &mut Vec<i32>, gap: i32) {
    match out.last_mut() {
        Some(last) if *last < 0 => match last.checked_add(gap) {
            Some(merged) => *last = merged,
            None => out.push(gap),
        },
        _ => out.push(gap),
    }
}

/// Mines every pivot of `range` in parallel and returns all accepted
/// patterns, grouped by pivot in ascending order.
pub fn mine_partitioned(
    transactions: &[(Vec<i32>, u32)],
    params: MiningParams,
    taxonomy: Arc<Taxonomy>,
    range: PivotRange,
) -> Result<Vec<(Vec<Item>, u64)>, MiningError> {
    let mut pivots = BTreeSet::new();
    for (entries, weight) in transactions {
        if *weight < 1 {
            return Err(MiningError::InvalidWeight(*weight));
        }
        for &entry in entries.iter().filter(|&&entry| entry >= 0) {
            let item = entry as Item;
            if !taxonomy.contains(item) {
                return Err(MiningError::UnknownItem {
                    item,
                    max: taxonomy.max_item(),
                });
            }
            pivots.extend(taxonomy.generalizations(item).filter(|&g| range.contains(g)));
        }
    }
    let pivots: Vec<Item> = pivots.into_iter().collect();
    log::debug!(
        "mining {} pivots over {} transactions",
        pivots.len(),
        transactions.len()
    );

    let partitions = pivots
        .par_iter()
        .map(|&pivot| mine_pivot(transactions, params, &taxonomy, pivot))
        .collect::<Result<Vec<_>, MiningError>>()?;

    Ok(partitions.into_iter().flatten().collect())
}

fn mine_pivot(
    transactions: &[(Vec<i32>, u32)],
    params: MiningParams,
    taxonomy: &Arc<Taxonomy>,
    pivot: Item,
) -> Result<Vec<(Vec<Item>, u64)>, MiningError> {
    let mut miner = IndexedPivotMiner::new(params, taxonomy.clone());
    miner.initialize_range(PivotRange::single(pivot));

    let mut projected = Vec::new();
    for (entries, weight) in transactions {
        if project_transaction(entries, taxonomy, pivot, &mut projected) {
            miner.add_transaction(&projected, *weight)?;
        }
    }

    let mut sink = CollectSink::new();
    let stats = miner.mine(&mut sink)?;
    log::trace!("pivot {}: {} patterns", pivot, stats.patterns);
    Ok(sink.into_patterns())
}

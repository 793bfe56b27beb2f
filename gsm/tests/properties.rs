//! Property-based tests for the mining engines
//!
//! 1. Posting lists round-trip and keep the separator unambiguous
//! 2. Every engine emits exactly the patterns a brute-force matcher finds
//! 3. Emitted patterns respect sigma and lambda
//! 4. Support is monotone under shortening and generalization

use std::collections::HashMap;
use std::sync::Arc;

use gsm::seq::utils::posting::{encode, Posting};
use gsm::seq::{
    mine_partitioned, mine_sequences, EngineKind, Item, MiningConfig, MiningParams, PivotRange,
    Taxonomy,
};
use proptest::prelude::*;

const MAX_ITEM: Item = 5;

type Database = Vec<(Vec<i32>, u32)>;

// ============================================================================
// Strategies
// ============================================================================

/// Postings with ascending transaction ids and ascending, distinct positions
fn postings_strategy() -> impl Strategy<Value = Vec<Posting>> {
    prop::collection::btree_map(
        0u32..5_000,
        prop::collection::btree_set(any::<u32>(), 1..6),
        0..8,
    )
    .prop_map(|map| {
        map.into_iter()
            .map(|(transaction, positions)| Posting {
                transaction,
                positions: positions.into_iter().collect(),
            })
            .collect()
    })
}

/// Random forests over items 1..=MAX_ITEM; parents may have larger or
/// smaller ids than their children
fn taxonomy_strategy() -> impl Strategy<Value = Taxonomy> {
    prop::collection::vec(0..=MAX_ITEM, MAX_ITEM as usize).prop_filter_map(
        "taxonomy must be acyclic",
        |raw| {
            let mut parents = vec![0];
            for (i, parent) in raw.into_iter().enumerate() {
                let item = i as Item + 1;
                parents.push(if parent == item { 0 } else { parent });
            }
            Taxonomy::from_parents(parents).ok()
        },
    )
}

fn entry_strategy() -> impl Strategy<Value = i32> {
    prop_oneof![
        5 => 1..=MAX_ITEM as i32,
        1 => -2..=-1i32,
    ]
}

fn database_strategy() -> impl Strategy<Value = Database> {
    prop::collection::vec(
        (prop::collection::vec(entry_strategy(), 0..7), 1u32..=3),
        0..7,
    )
}

fn params_strategy() -> impl Strategy<Value = MiningParams> {
    (1u64..=3, 0u32..=2, 1u32..=3)
        .prop_map(|(sigma, gamma, lambda)| MiningParams::new(sigma, gamma, lambda).unwrap())
}

// ============================================================================
// Brute-force reference
// ============================================================================

/// Real items of a transaction with their expanded positions
fn expanded(entries: &[i32]) -> Vec<(u64, Item)> {
    let mut position = 0u64;
    let mut out = Vec::new();
    for &entry in entries {
        if entry < 0 {
            position += u64::from(entry.unsigned_abs());
        } else {
            out.push((position, entry as Item));
            position += 1;
        }
    }
    out
}

fn matches_from(
    items: &[(u64, Item)],
    start: usize,
    pattern: &[Item],
    gamma: u32,
    taxonomy: &Taxonomy,
) -> bool {
    let Some((&next, rest)) = pattern.split_first() else {
        return true;
    };
    let (position, _) = items[start];
    items[start + 1..]
        .iter()
        .enumerate()
        .take_while(|(_, &(p, _))| p - position - 1 <= u64::from(gamma))
        .any(|(offset, &(_, item))| {
            taxonomy.is_generalization_of(next, item)
                && matches_from(items, start + 1 + offset, rest, gamma, taxonomy)
        })
}

fn occurs(entries: &[i32], pattern: &[Item], gamma: u32, taxonomy: &Taxonomy) -> bool {
    let items = expanded(entries);
    items.iter().enumerate().any(|(start, &(_, item))| {
        taxonomy.is_generalization_of(pattern[0], item)
            && matches_from(&items, start, &pattern[1..], gamma, taxonomy)
    })
}

fn support(db: &Database, pattern: &[Item], gamma: u32, taxonomy: &Taxonomy) -> u64 {
    db.iter()
        .filter(|(entries, _)| occurs(entries, pattern, gamma, taxonomy))
        .map(|&(_, weight)| u64::from(weight))
        .sum()
}

/// Every frequent pattern over items 1..=MAX_ITEM, sorted
fn brute_force(db: &Database, params: MiningParams, taxonomy: &Taxonomy) -> Vec<(Vec<Item>, u64)> {
    let mut result = Vec::new();
    let mut frontier: Vec<Vec<Item>> = vec![Vec::new()];
    for _ in 0..params.lambda() {
        let mut next = Vec::new();
        for prefix in &frontier {
            for item in 1..=MAX_ITEM {
                let mut pattern = prefix.clone();
                pattern.push(item);
                let s = support(db, &pattern, params.gamma(), taxonomy);
                // anti-monotone: extensions of infrequent patterns stay infrequent
                if s >= params.sigma() {
                    result.push((pattern.clone(), s));
                    next.push(pattern);
                }
            }
        }
        frontier = next;
    }
    result.sort();
    result
}

fn mine_sorted(
    db: &Database,
    params: MiningParams,
    taxonomy: &Arc<Taxonomy>,
    engine: EngineKind,
) -> Vec<(Vec<Item>, u64)> {
    let config = MiningConfig::new(params).with_engine(engine);
    let mut patterns = mine_sequences(db, config, taxonomy.clone()).unwrap();
    patterns.sort();
    patterns
}

// ============================================================================
// Codec
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn posting_lists_round_trip(postings in postings_strategy()) {
        let list = encode(&postings);
        prop_assert_eq!(list.decode().unwrap(), postings.clone());

        // one separator between consecutive postings, none inside values
        let separators = list.as_bytes().iter().filter(|&&b| b == 0).count();
        prop_assert_eq!(separators, postings.len().saturating_sub(1));
    }
}

// ============================================================================
// Engines
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn engines_match_brute_force(
        db in database_strategy(),
        params in params_strategy(),
        taxonomy in taxonomy_strategy(),
    ) {
        let expected = brute_force(&db, params, &taxonomy);
        let taxonomy = Arc::new(taxonomy);
        for engine in EngineKind::ALL {
            prop_assert_eq!(
                &mine_sorted(&db, params, &taxonomy, engine),
                &expected,
                "{} engine",
                engine
            );
        }

        let mut partitioned =
            mine_partitioned(&db, params, taxonomy.clone(), PivotRange::all()).unwrap();
        partitioned.sort();
        prop_assert_eq!(&partitioned, &expected);
    }

    #[test]
    fn output_respects_thresholds(
        db in database_strategy(),
        params in params_strategy(),
        taxonomy in taxonomy_strategy(),
    ) {
        let taxonomy = Arc::new(taxonomy);
        for engine in EngineKind::ALL {
            let patterns = mine_sorted(&db, params, &taxonomy, engine);
            for (pattern, support) in &patterns {
                prop_assert!(*support >= params.sigma());
                prop_assert!(!pattern.is_empty());
                prop_assert!(pattern.len() <= params.max_len());
            }
            // no pattern is reported twice
            let mut distinct: Vec<_> = patterns.iter().map(|(p, _)| p).collect();
            distinct.dedup();
            prop_assert_eq!(distinct.len(), patterns.len());
        }
    }

    #[test]
    fn support_is_monotone(
        db in database_strategy(),
        params in params_strategy(),
        taxonomy in taxonomy_strategy(),
    ) {
        let taxonomy = Arc::new(taxonomy);
        let patterns = mine_sorted(&db, params, &taxonomy, EngineKind::Dfs);
        let supports: HashMap<&[Item], u64> =
            patterns.iter().map(|(p, s)| (p.as_slice(), *s)).collect();

        for (pattern, support) in &patterns {
            if pattern.len() > 1 {
                let without_first = &pattern[1..];
                let without_last = &pattern[..pattern.len() - 1];
                prop_assert!(supports.get(without_first).is_some_and(|s| s >= support));
                prop_assert!(supports.get(without_last).is_some_and(|s| s >= support));
            }
            for (i, &item) in pattern.iter().enumerate() {
                if let Some(parent) = taxonomy.parent(item) {
                    let mut general = pattern.clone();
                    general[i] = parent;
                    prop_assert!(
                        supports.get(general.as_slice()).is_some_and(|s| s >= support),
                        "{:?} generalizes {:?}",
                        general,
                        pattern
                    );
                }
            }
        }
    }
}

use std::collections::BTreeSet;
use std::sync::Arc;

use gsm::seq::parallel::project_transaction;
use gsm::seq::{
    build_miner, mine_partitioned, CollectSink, CountingSink, EngineKind, Item, MiningConfig,
    MiningParams, MiningSession, PivotRange, SequenceMiner, Taxonomy, TextSink,
};

/// Small product hierarchy: 1,2 -> 6; 3 -> 7; 4,5 -> 8; 6,7 -> 9
fn taxonomy() -> Arc<Taxonomy> {
    Arc::new(Taxonomy::from_parents(vec![0, 6, 6, 7, 8, 8, 9, 9, 0, 0]).unwrap())
}

fn database() -> Vec<(Vec<i32>, u32)> {
    vec![
        (vec![1, 3, 4, -1, 2, 5], 1),
        (vec![2, 3, 5, 1], 2),
        (vec![1, -2, 3, 4, 2], 1),
        (vec![4, 1, 3, -1, 5, 2], 1),
        (vec![3, 2, 4], 3),
        (vec![], 1),
        (vec![5, -3, 1], 1),
    ]
}

fn mine(engine: EngineKind, params: MiningParams) -> Vec<(Vec<Item>, u64)> {
    let mut session = MiningSession::new(MiningConfig::new(params).with_engine(engine), taxonomy());
    for (entries, weight) in database() {
        session.add_transaction(&entries, weight).unwrap();
    }
    let mut patterns = session.mine_to_vec().unwrap();
    patterns.sort();
    patterns
}

/// Union of single-pivot runs of one engine, transactions projected per pivot.
fn mine_per_pivot(engine: EngineKind, params: MiningParams) -> Vec<(Vec<Item>, u64)> {
    let taxonomy = taxonomy();
    let mut all = Vec::new();
    let mut projected = Vec::new();
    for pivot in 1..=taxonomy.max_item() {
        let mut miner = build_miner(engine, params, taxonomy.clone());
        miner.initialize_range(PivotRange::single(pivot));
        for (entries, weight) in database() {
            if project_transaction(&entries, &taxonomy, pivot, &mut projected) {
                miner.add_transaction(&projected, weight).unwrap();
            }
        }
        let mut sink = CollectSink::new();
        miner.mine(&mut sink).unwrap();
        all.extend(sink.into_patterns());
    }
    all.sort();
    all
}

#[test]
fn all_engines_agree() {
    for (sigma, gamma, lambda) in [(2, 0, 3), (3, 1, 4), (4, 2, 3), (1, 1, 2)] {
        let params = MiningParams::new(sigma, gamma, lambda).unwrap();
        let reference = mine(EngineKind::Dfs, params);
        assert!(!reference.is_empty());

        for engine in [EngineKind::Bfs, EngineKind::Pivot, EngineKind::IndexedPivot] {
            assert_eq!(mine(engine, params), reference, "{} with {:?}", engine, params);
        }
        for engine in [EngineKind::Pivot, EngineKind::IndexedPivot] {
            assert_eq!(
                mine_per_pivot(engine, params),
                reference,
                "per-pivot {} with {:?}",
                engine,
                params
            );
        }

        let mut parallel = mine_partitioned(&database(), params, taxonomy(), PivotRange::all()).unwrap();
        parallel.sort();
        assert_eq!(parallel, reference);
    }
}

#[test]
fn generalized_patterns_are_found() {
    let params = MiningParams::new(5, 0, 2).unwrap();
    let patterns = mine(EngineKind::Dfs, params);
    // no pair of leaves reaches support 5 without gaps, their common root does
    assert!(patterns.iter().any(|(p, s)| p == &vec![9, 9] && *s >= 5));
    assert!(patterns.iter().all(|(_, s)| *s >= 5));
}

#[test]
fn partitioned_output_is_grouped_by_pivot() {
    let params = MiningParams::new(3, 1, 3).unwrap();
    let patterns = mine_partitioned(&database(), params, taxonomy(), PivotRange::new(4, 7).unwrap()).unwrap();
    assert!(!patterns.is_empty());

    let pivots: Vec<Item> = patterns
        .iter()
        .map(|(p, _)| *p.iter().max().unwrap())
        .collect();
    assert!(pivots.windows(2).all(|w| w[0] <= w[1]));
    assert!(pivots.iter().all(|&p| (4..=7).contains(&p)));

    let distinct: BTreeSet<_> = patterns.iter().map(|(p, _)| p.clone()).collect();
    assert_eq!(distinct.len(), patterns.len());
}

#[test]
fn counting_and_text_sinks_see_the_same_patterns() {
    let params = MiningParams::new(3, 1, 3).unwrap();
    let config = MiningConfig::new(params).with_engine(EngineKind::IndexedPivot);

    let mut session = MiningSession::new(config, taxonomy());
    for (entries, weight) in database() {
        session.add_transaction(&entries, weight).unwrap();
    }
    let mut counter = CountingSink::default();
    let stats = session.mine(&mut counter).unwrap();
    assert_eq!(stats.patterns, counter.count);

    for (entries, weight) in database() {
        session.add_transaction(&entries, weight).unwrap();
    }
    let mut text = TextSink::new(Vec::new());
    session.mine(&mut text).unwrap();
    let output = String::from_utf8(text.into_inner()).unwrap();
    assert_eq!(output.lines().count() as u64, counter.count);
    assert!(output.lines().all(|line| line.contains('\t')));
}

#[test]
fn scanned_database_matches_added_transactions() {
    let params = MiningParams::new(2, 1, 3).unwrap();
    let text = "1 3 4 -1 2 5\n2 3 5 1\n\n1 -2 3 4 2\n";

    let mut scanned = MiningSession::new(MiningConfig::new(params), taxonomy());
    assert_eq!(scanned.scan_database(text.as_bytes()).unwrap(), 3);

    let mut added = MiningSession::new(MiningConfig::new(params), taxonomy());
    for line in text.lines().filter(|l| !l.is_empty()) {
        let entries: Vec<i32> = line.split_whitespace().map(|t| t.parse().unwrap()).collect();
        added.add_transaction(&entries, 1).unwrap();
    }

    assert_eq!(scanned.mine_to_vec().unwrap(), added.mine_to_vec().unwrap());
}

struct FullSink;

impl gsm::seq::ResultSink for FullSink {
    fn write(&mut self, _pattern: &[Item], _support: u64) -> std::io::Result<()> {
        Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "no space left"))
    }
}

#[test]
fn sink_failure_leaves_session_reusable() {
    let params = MiningParams::new(2, 1, 3).unwrap();
    for engine in EngineKind::ALL {
        let mut session = MiningSession::new(MiningConfig::new(params).with_engine(engine), taxonomy());
        for (entries, weight) in database() {
            session.add_transaction(&entries, weight).unwrap();
        }
        let err = session.mine(&mut FullSink).unwrap_err();
        assert!(matches!(err, gsm::MiningError::Sink(_)), "{} engine", engine);
        assert_eq!(session.pending_transactions(), 0);

        // ready for the next batch
        session.add_transaction(&[1, 3], 2).unwrap();
        let patterns = session.mine_to_vec().unwrap();
        assert!(patterns.contains(&(vec![1, 3], 2)), "{} engine", engine);
    }
}

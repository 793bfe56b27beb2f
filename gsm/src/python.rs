use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::{pymodule, types::PyModule, Bound, PyErr, PyResult};

use crate::seq::{
    mine_partitioned, mine_sequences, EngineKind, Item, MiningConfig, MiningError, MiningParams,
    MiningSession, PivotRange, Taxonomy,
};

// Global storage for streaming sessions
static SESSIONS: Lazy<Mutex<HashMap<usize, MiningSession>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
static NEXT_SID: Lazy<Mutex<usize>> = Lazy::new(|| Mutex::new(0));

fn mining_err(e: MiningError) -> PyErr {
    match e {
        MiningError::Sink(_) | MiningError::Io(_) => PyRuntimeError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

fn lock_err<T>(e: std::sync::PoisonError<T>) -> PyErr {
    PyRuntimeError::new_err(format!("Lock error: {}", e))
}

fn parse_engine(engine: &str) -> PyResult<EngineKind> {
    engine.parse::<EngineKind>().map_err(mining_err)
}

fn build_taxonomy(parents: Option<Vec<Item>>, max_item: Item) -> PyResult<Arc<Taxonomy>> {
    let taxonomy = match parents {
        Some(parents) => Taxonomy::from_parents(parents).map_err(mining_err)?,
        None => Taxonomy::try_flat(max_item).map_err(mining_err)?,
    };
    Ok(Arc::new(taxonomy))
}

fn largest_item(transactions: &[Vec<i32>]) -> Item {
    transactions
        .iter()
        .flatten()
        .filter(|&&entry| entry > 0)
        .map(|&entry| entry as Item)
        .max()
        .unwrap_or(0)
}

fn weighted(transactions: Vec<Vec<i32>>, weights: Option<Vec<u32>>) -> PyResult<Vec<(Vec<i32>, u32)>> {
    match weights {
        None => Ok(transactions.into_iter().map(|t| (t, 1)).collect()),
        Some(weights) if weights.len() == transactions.len() => {
            Ok(transactions.into_iter().zip(weights).collect())
        }
        Some(weights) => Err(PyValueError::new_err(format!(
            "got {} weights for {} transactions",
            weights.len(),
            transactions.len()
        ))),
    }
}

#[pymodule]
fn gsm<'py>(m: &Bound<'py, PyModule>) -> PyResult<()> {
    #[pyfn(m)]
    #[pyo3(
        name = "mine_sequences",
        signature = (transactions, min_support, max_gap, max_length, engine = "dfs", parents = None, weights = None)
    )]
    fn mine_sequences_py(
        transactions: Vec<Vec<i32>>,
        min_support: i64,
        max_gap: i64,
        max_length: i64,
        engine: &str,
        parents: Option<Vec<Item>>,
        weights: Option<Vec<u32>>,
    ) -> PyResult<Vec<(Vec<Item>, u64)>> {
        let params = MiningParams::from_signed(min_support, max_gap, max_length).map_err(mining_err)?;
        let config = MiningConfig::new(params).with_engine(parse_engine(engine)?);
        let taxonomy = build_taxonomy(parents, largest_item(&transactions))?;
        let data = weighted(transactions, weights)?;
        mine_sequences(&data, config, taxonomy).map_err(mining_err)
    }

    #[pyfn(m)]
    #[pyo3(
        name = "mine_parallel",
        signature = (transactions, min_support, max_gap, max_length, parents = None, weights = None)
    )]
    fn mine_parallel_py(
        transactions: Vec<Vec<i32>>,
        min_support: i64,
        max_gap: i64,
        max_length: i64,
        parents: Option<Vec<Item>>,
        weights: Option<Vec<u32>>,
    ) -> PyResult<Vec<(Vec<Item>, u64)>> {
        let params = MiningParams::from_signed(min_support, max_gap, max_length).map_err(mining_err)?;
        let taxonomy = build_taxonomy(parents, largest_item(&transactions))?;
        let data = weighted(transactions, weights)?;
        mine_partitioned(&data, params, taxonomy, PivotRange::all()).map_err(mining_err)
    }

    // Streaming sessions
    #[pyfn(m)]
    #[pyo3(
        name = "create_session",
        signature = (min_support, max_gap, max_length, engine = "dfs", parents = None, max_item = 0)
    )]
    fn create_session_py(
        min_support: i64,
        max_gap: i64,
        max_length: i64,
        engine: &str,
        parents: Option<Vec<Item>>,
        max_item: Item,
    ) -> PyResult<usize> {
        let params = MiningParams::from_signed(min_support, max_gap, max_length).map_err(mining_err)?;
        let config = MiningConfig::new(params).with_engine(parse_engine(engine)?);
        if parents.is_none() && max_item == 0 {
            return Err(PyValueError::new_err("either parents or max_item is required"));
        }
        let session = MiningSession::new(config, build_taxonomy(parents, max_item)?);

        let mut sid_lock = NEXT_SID.lock().map_err(lock_err)?;
        let sid = *sid_lock;
        *sid_lock += 1;
        drop(sid_lock);

        let mut sessions = SESSIONS.lock().map_err(lock_err)?;
        sessions.insert(sid, session);
        Ok(sid)
    }

    #[pyfn(m)]
    #[pyo3(name = "session_add_transaction", signature = (sid, entries, weight = 1))]
    fn session_add_transaction_py(sid: usize, entries: Vec<i32>, weight: u32) -> PyResult<()> {
        let mut sessions = SESSIONS.lock().map_err(lock_err)?;
        let session = sessions
            .get_mut(&sid)
            .ok_or_else(|| PyValueError::new_err("Invalid session ID"))?;
        session.add_transaction(&entries, weight).map_err(mining_err)
    }

    #[pyfn(m)]
    #[pyo3(name = "session_scan_file")]
    fn session_scan_file_py(sid: usize, path: &str) -> PyResult<usize> {
        let file = File::open(path).map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
        let mut sessions = SESSIONS.lock().map_err(lock_err)?;
        let session = sessions
            .get_mut(&sid)
            .ok_or_else(|| PyValueError::new_err("Invalid session ID"))?;
        session.scan_database(BufReader::new(file)).map_err(mining_err)
    }

    #[pyfn(m)]
    #[pyo3(name = "session_mine")]
    fn session_mine_py(sid: usize) -> PyResult<Vec<(Vec<Item>, u64)>> {
        let mut sessions = SESSIONS.lock().map_err(lock_err)?;
        let session = sessions
            .get_mut(&sid)
            .ok_or_else(|| PyValueError::new_err("Invalid session ID"))?;
        session.mine_to_vec().map_err(mining_err)
    }

    #[pyfn(m)]
    #[pyo3(name = "session_cleanup")]
    fn session_cleanup_py(sid: usize) -> PyResult<()> {
        let mut sessions = SESSIONS.lock().map_err(lock_err)?;
        sessions
            .remove(&sid)
            .ok_or_else(|| PyValueError::new_err("Invalid session ID"))?;
        Ok(())
    }

    Ok(())
}

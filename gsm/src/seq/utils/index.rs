use std::collections::BTreeMap;
use std::fmt::Debug;

use super::posting::PostingList;

/// A position payload stored in a posting list.
pub trait Anchor: Copy + Ord + Debug {
    fn write_to(self, list: &mut PostingList);
}

impl Anchor for u32 {
    fn write_to(self, list: &mut PostingList) {
        list.push_value(self);
    }
}

/// Leftmost and rightmost matched position of a pivot-anchored occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub left: u32,
    pub right: u32,
}

impl Span {
    pub fn at(position: u32) -> Self {
        Self {
            left: position,
            right: position,
        }
    }
}

impl Anchor for Span {
    fn write_to(self, list: &mut PostingList) {
        list.push_value(self.left);
        list.push_value(self.right);
    }
}

/// Support and posting list of one key, built transaction by transaction.
///
/// Anchors of the current transaction are buffered and written sorted and
/// de-duplicated once the next transaction starts, so every posting holds
/// strictly ascending anchors even when the scan produces them out of order.
#[derive(Debug, Clone)]
pub struct Occurrences<P> {
    support: u64,
    last_transaction: Option<u32>,
    pending: Vec<P>,
    postings: PostingList,
}

impl<P: Anchor> Occurrences<P> {
    fn new() -> Self {
        Self {
            support: 0,
            last_transaction: None,
            pending: Vec::new(),
            postings: PostingList::new(),
        }
    }

    fn add(&mut self, transaction: u32, weight: u64, anchor: P) {
        if self.last_transaction != Some(transaction) {
            self.flush();
            self.postings.begin_posting(transaction);
            self.support += weight;
            self.last_transaction = Some(transaction);
        }
        if self.pending.last() != Some(&anchor) {
            self.pending.push(anchor);
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        self.pending.sort_unstable();
        self.pending.dedup();
        for &anchor in &self.pending {
            anchor.write_to(&mut self.postings);
        }
        self.pending.clear();
    }

    pub fn support(&self) -> u64 {
        self.support
    }

    pub fn into_postings(mut self) -> PostingList {
        self.flush();
        self.postings
    }
}

/// Ordered map from a key (item, item pair, ...) to its occurrences.
///
/// Iteration is in ascending key order, which fixes the order in which the
/// engines emit patterns.
#[derive(Debug, Clone)]
pub struct OccurrenceIndex<K, P> {
    entries: BTreeMap<K, Occurrences<P>>,
}

impl<K, P> Default for OccurrenceIndex<K, P> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy, P: Anchor> OccurrenceIndex<K, P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an occurrence of `key` at `anchor`. The support of a key grows
    /// by `weight` only for the first occurrence within a transaction.
    pub fn add(&mut self, key: K, transaction: u32, weight: u64, anchor: P) {
        self.entries
            .entry(key)
            .or_insert_with(Occurrences::new)
            .add(transaction, weight, anchor);
    }

    pub fn support(&self, key: &K) -> u64 {
        self.entries.get(key).map_or(0, Occurrences::support)
    }

    pub fn supports(&self) -> impl Iterator<Item = (K, u64)> + '_ {
        self.entries.iter().map(|(&key, occ)| (key, occ.support))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Consumes the index, yielding `(key, support, postings)` for every key
    /// with support of at least `sigma`, in ascending key order. Entries are
    /// released as the iterator advances.
    pub fn into_frequent(self, sigma: u64) -> impl Iterator<Item = (K, u64, PostingList)> {
        self.entries
            .into_iter()
            .filter(move |(_, occ)| occ.support >= sigma)
            .map(|(key, occ)| (key, occ.support, occ.into_postings()))
    }
}

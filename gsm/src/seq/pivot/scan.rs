use std::collections::{HashMap, HashSet};
use std::mem;

use crate::seq::config::PivotRange;
use crate::seq::error::CodecError;
use crate::seq::taxonomy::Taxonomy;
use crate::seq::utils::{left_of, right_of, OccurrenceIndex, PostingList, Span, TransactionStore};
use crate::seq::Item;

/// Data gathered while ingesting transactions for the pivot engines.
#[derive(Debug, Default)]
pub struct PivotIndex {
    /// Support of every item, ancestors included, counted once per transaction.
    supports: HashMap<Item, u64>,
    /// Occurrences of each pivot-range item or of a descendant of it.
    pivots: OccurrenceIndex<Item, Span>,
    seen: HashSet<Item>,
}

impl PivotIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        taxonomy: &Taxonomy,
        range: PivotRange,
        transaction: u32,
        weight: u64,
        entries: &[i32],
    ) {
        self.seen.clear();
        for (position, &entry) in entries.iter().enumerate() {
            if entry < 0 {
                continue;
            }
            for item in taxonomy.generalizations(entry as Item) {
                self.seen.insert(item);
                if range.contains(item) {
                    self.pivots
                        .add(item, transaction, weight, Span::at(position as u32));
                }
            }
        }
        for &item in &self.seen {
            *self.supports.entry(item).or_insert(0) += weight;
        }
    }

    /// Hands out the frequent items and the pivot occurrences, leaving the
    /// index empty.
    pub fn finish(&mut self, sigma: u64) -> (HashSet<Item>, OccurrenceIndex<Item, Span>) {
        let frequent = mem::take(&mut self.supports)
            .into_iter()
            .filter(|&(_, support)| support >= sigma)
            .map(|(item, _)| item)
            .collect();
        (frequent, mem::take(&mut self.pivots))
    }

    pub fn clear(&mut self) {
        self.supports.clear();
        self.pivots.clear();
        self.seen.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Collects one-item extensions of a pattern from its span postings.
#[derive(Clone, Copy)]
pub struct Scanner<'a> {
    pub transactions: &'a TransactionStore,
    pub taxonomy: &'a Taxonomy,
    pub gamma: u32,
}

impl<'a> Scanner<'a> {
    /// Items (and their ancestors) right of each span, keyed by item, with
    /// spans whose right end moved to the item.
    pub fn right<F>(&self, postings: &PostingList, accept: F) -> Result<OccurrenceIndex<Item, Span>, CodecError>
    where
        F: FnMut(Item) -> bool,
    {
        self.scan(postings, Side::Right, accept)
    }

    /// Items (and their ancestors) left of each span, with spans whose left
    /// end moved to the item.
    pub fn left<F>(&self, postings: &PostingList, accept: F) -> Result<OccurrenceIndex<Item, Span>, CodecError>
    where
        F: FnMut(Item) -> bool,
    {
        self.scan(postings, Side::Left, accept)
    }

    fn scan<F>(
        &self,
        postings: &PostingList,
        side: Side,
        mut accept: F,
    ) -> Result<OccurrenceIndex<Item, Span>, CodecError>
    where
        F: FnMut(Item) -> bool,
    {
        let mut local = OccurrenceIndex::new();
        postings.try_for_each_posting(|tid, cursor| -> Result<(), CodecError> {
            let entries = self.transactions.get(tid);
            let weight = self.transactions.weight(tid);
            while cursor.has_next_value() {
                let (left, right) = cursor.next_span()?;
                let window = match side {
                    Side::Right => right_of(entries, right as usize, self.gamma),
                    Side::Left => left_of(entries, left as usize, self.gamma),
                };
                for (index, item) in window {
                    let span = match side {
                        Side::Right => Span { left, right: index as u32 },
                        Side::Left => Span { left: index as u32, right },
                    };
                    for candidate in self.taxonomy.generalizations(item) {
                        if accept(candidate) {
                            local.add(candidate, tid, weight, span);
                        }
                    }
                }
            }
            Ok(())
        })?;
        Ok(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq::utils::posting::Posting;

    #[test]
    fn pivots_are_recorded_through_descendants() {
        // 1 -> 2
        let taxonomy = Taxonomy::from_parents(vec![0, 2, 0, 0]).unwrap();
        let mut index = PivotIndex::new();
        index.add(&taxonomy, PivotRange::single(2), 0, 1, &[1, 3, 2]);
        index.add(&taxonomy, PivotRange::single(2), 1, 1, &[3]);

        let (frequent, pivots) = index.finish(2);
        assert_eq!(frequent, HashSet::from([3]));
        let (pivot, support, postings) = pivots.into_frequent(1).next().unwrap();
        assert_eq!((pivot, support), (2, 1));
        assert_eq!(
            postings.decode().unwrap(),
            vec![Posting { transaction: 0, positions: vec![0, 0, 2, 2] }]
        );
    }

    #[test]
    fn scans_move_the_matching_span_end() {
        let taxonomy = Taxonomy::flat(4);
        let mut transactions = TransactionStore::new();
        transactions.push(&[1, 4, 2, 3], 1);
        let scanner = Scanner { transactions: &transactions, taxonomy: &taxonomy, gamma: 0 };

        let mut postings = PostingList::new();
        postings.begin_posting(0);
        postings.push_value(1);
        postings.push_value(2);

        let right: Vec<_> = scanner
            .right(&postings, |_| true)
            .unwrap()
            .into_frequent(1)
            .map(|(item, _, list)| (item, list.decode().unwrap()[0].positions.clone()))
            .collect();
        assert_eq!(right, vec![(3, vec![1, 3])]);

        let left: Vec<_> = scanner
            .left(&postings, |item| item < 1)
            .unwrap()
            .into_frequent(1)
            .collect();
        assert!(left.is_empty());
    }
}

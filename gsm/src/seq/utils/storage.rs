use crate::seq::Item;

use super::posting::PostingList;

/// Transactions stored back to back in one flat array
#[derive(Debug, Clone, Default)]
pub struct TransactionStore {
    entries: Vec<i32>,
    offsets: Vec<(usize, usize)>,
    weights: Vec<u32>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(estimated_entries: usize, estimated_transactions: usize) -> Self {
        Self {
            entries: Vec::with_capacity(estimated_entries),
            offsets: Vec::with_capacity(estimated_transactions),
            weights: Vec::with_capacity(estimated_transactions),
        }
    }

    /// Appends a transaction and returns its id.
    pub fn push(&mut self, entries: &[i32], weight: u32) -> u32 {
        let start = self.entries.len();
        self.entries.extend_from_slice(entries);
        self.offsets.push((start, entries.len()));
        self.weights.push(weight);
        (self.offsets.len() - 1) as u32
    }

    pub fn get(&self, transaction: u32) -> &[i32] {
        let (start, length) = self.offsets[transaction as usize];
        &self.entries[start..start + length]
    }

    pub fn weight(&self, transaction: u32) -> u64 {
        u64::from(self.weights[transaction as usize])
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries = Vec::new();
        self.offsets = Vec::new();
        self.weights = Vec::new();
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[i32], u64)> + '_ {
        (0..self.offsets.len() as u32).map(move |tid| (tid, self.get(tid), self.weight(tid)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Full { start: usize },
    Shared { head: usize, suffix: Item },
}

/// One level of the join miner: all frequent sequences of one length.
///
/// A sequence is stored either in full or as a reference to the first
/// sequence produced from the same left parent plus its own last item, since
/// both share everything but the suffix.
#[derive(Debug, Clone)]
pub struct SequenceLevel {
    items: Vec<Item>,
    entries: Vec<Entry>,
    supports: Vec<u64>,
    postings: Vec<PostingList>,
    pub sequence_len: usize,
}

impl SequenceLevel {
    pub fn new(sequence_len: usize) -> Self {
        Self {
            items: Vec::new(),
            entries: Vec::new(),
            supports: Vec::new(),
            postings: Vec::new(),
            sequence_len,
        }
    }

    pub fn push_full(&mut self, sequence: &[Item], support: u64, postings: PostingList) -> usize {
        debug_assert_eq!(sequence.len(), self.sequence_len);
        let start = self.items.len();
        self.items.extend_from_slice(sequence);
        self.push_entry(Entry::Full { start }, support, postings)
    }

    /// Stores a sequence equal to `head` with its last item replaced.
    pub fn push_shared(
        &mut self,
        head: usize,
        suffix: Item,
        support: u64,
        postings: PostingList,
    ) -> usize {
        debug_assert!(head < self.entries.len());
        self.push_entry(Entry::Shared { head, suffix }, support, postings)
    }

    fn push_entry(&mut self, entry: Entry, support: u64, postings: PostingList) -> usize {
        self.entries.push(entry);
        self.supports.push(support);
        self.postings.push(postings);
        self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_shared(&self, idx: usize) -> bool {
        matches!(self.entries[idx], Entry::Shared { .. })
    }

    pub fn support(&self, idx: usize) -> u64 {
        self.supports[idx]
    }

    pub fn postings(&self, idx: usize) -> &PostingList {
        &self.postings[idx]
    }

    pub fn last_item(&self, idx: usize) -> Item {
        match self.entries[idx] {
            Entry::Full { start } => self.items[start + self.sequence_len - 1],
            Entry::Shared { suffix, .. } => suffix,
        }
    }

    /// Writes the sequence at `idx` into `out`, replacing its contents.
    pub fn write_sequence(&self, idx: usize, out: &mut Vec<Item>) {
        match self.entries[idx] {
            Entry::Full { start } => {
                out.clear();
                out.extend_from_slice(&self.items[start..start + self.sequence_len]);
            }
            Entry::Shared { head, suffix } => {
                self.write_sequence(head, out);
                out.pop();
                out.push(suffix);
            }
        }
    }

    pub fn sequence(&self, idx: usize) -> Vec<Item> {
        let mut out = Vec::with_capacity(self.sequence_len);
        self.write_sequence(idx, &mut out);
        out
    }

    pub fn iter_sequences(&self) -> impl Iterator<Item = Vec<Item>> + '_ {
        (0..self.len()).map(move |idx| self.sequence(idx))
    }
}

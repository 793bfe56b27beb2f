//! Compressed posting lists.
//!
//! A posting list is a sequence of postings, one per transaction, separated by
//! a single 0 byte. A posting starts with the transaction id and continues
//! with the positions at which the pattern occurs in that transaction. Every
//! value `v` is stored as the LEB128 encoding of `v + 1`: the encoding of a
//! non-zero value never contains a 0 byte (all bytes but the last carry the
//! continuation bit, the last one holds the non-zero high bits), which keeps
//! the separator unambiguous.
//!
//! ```text
//! [tid+1] [pos+1] [pos+1] ... 0 [tid+1] [pos+1] ...
//! ```

use crate::seq::error::CodecError;

/// Byte separating two postings.
pub const SEPARATOR: u8 = 0;

// u32::MAX + 1 needs 33 bits, i.e. five 7-bit groups.
const MAX_SHIFT: u32 = 28;

/// Growable byte buffer holding an encoded posting list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    bytes: Vec<u8>,
}

/// A decoded posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub transaction: u32,
    pub positions: Vec<u32>,
}

impl PostingList {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
        }
    }

    /// Wraps raw bytes without validating them; the cursor reports errors.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Starts the posting of a new transaction.
    pub fn begin_posting(&mut self, transaction: u32) {
        if !self.bytes.is_empty() {
            self.bytes.push(SEPARATOR);
        }
        self.push_value(transaction);
    }

    /// Appends one value to the current posting.
    pub fn push_value(&mut self, value: u32) {
        let mut value = u64::from(value) + 1;
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.bytes.push(byte);
                return;
            }
            self.bytes.push(byte | 0x80);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn cursor(&self) -> PostingCursor<'_> {
        PostingCursor::new(&self.bytes)
    }

    /// Calls `visit` once per posting with its transaction id and a cursor
    /// positioned on the posting's first value. Values the visitor leaves
    /// unread are skipped.
    pub fn try_for_each_posting<E, F>(&self, mut visit: F) -> Result<(), E>
    where
        E: From<CodecError>,
        F: FnMut(u32, &mut PostingCursor<'_>) -> Result<(), E>,
    {
        if self.bytes.is_empty() {
            return Ok(());
        }
        let mut cursor = self.cursor();
        loop {
            let transaction = cursor.next_value()?;
            visit(transaction, &mut cursor)?;
            if !cursor.next_posting()? {
                return Ok(());
            }
        }
    }

    /// Fully decodes and validates the list.
    pub fn decode(&self) -> Result<Vec<Posting>, CodecError> {
        let mut postings = Vec::new();
        self.try_for_each_posting(|transaction, cursor| {
            let start = cursor.offset();
            let mut positions = Vec::new();
            while cursor.has_next_value() {
                positions.push(cursor.next_value()?);
            }
            if positions.is_empty() {
                return Err(CodecError::EmptyPosting(start));
            }
            postings.push(Posting {
                transaction,
                positions,
            });
            Ok(())
        })?;
        Ok(postings)
    }
}

/// Encodes postings as given; positions should already be ascending and
/// free of duplicates.
pub fn encode(postings: &[Posting]) -> PostingList {
    let mut list = PostingList::new();
    for posting in postings {
        list.begin_posting(posting.transaction);
        for &position in &posting.positions {
            list.push_value(position);
        }
    }
    list
}

/// Read cursor over an encoded posting list.
#[derive(Debug, Clone)]
pub struct PostingCursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> PostingCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// False at a separator or at the end of the list.
    pub fn has_next_value(&self) -> bool {
        matches!(self.bytes.get(self.offset), Some(&byte) if byte != SEPARATOR)
    }

    pub fn next_value(&mut self) -> Result<u32, CodecError> {
        let start = self.offset;
        match self.bytes.get(start) {
            None => return Err(CodecError::UnexpectedEnd(start)),
            Some(&SEPARATOR) => return Err(CodecError::UnexpectedSeparator(start)),
            Some(_) => {}
        }

        let mut encoded: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = match self.bytes.get(self.offset) {
                Some(&byte) if byte != SEPARATOR => byte,
                _ => return Err(CodecError::Truncated(start)),
            };
            self.offset += 1;
            encoded |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            if shift == MAX_SHIFT {
                return Err(CodecError::Overflow(start));
            }
            shift += 7;
        }

        u32::try_from(encoded - 1).map_err(|_| CodecError::Overflow(start))
    }

    /// Reads a `(left, right)` pair of positions.
    pub fn next_span(&mut self) -> Result<(u32, u32), CodecError> {
        let left = self.next_value()?;
        let right = self.next_value()?;
        Ok((left, right))
    }

    /// Skips the rest of the current posting and its separator. Returns
    /// false when the list is exhausted.
    pub fn next_posting(&mut self) -> Result<bool, CodecError> {
        while self.has_next_value() {
            self.next_value()?;
        }
        if self.offset >= self.bytes.len() {
            return Ok(false);
        }
        let separator = self.offset;
        self.offset += 1;
        if self.offset == self.bytes.len() {
            return Err(CodecError::DanglingSeparator(separator));
        }
        Ok(true)
    }
}

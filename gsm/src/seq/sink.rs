//! Consumers of mined patterns.

use std::io::{self, Write};

use super::error::MiningError;
use super::Item;

/// Receives every accepted pattern together with its support.
///
/// A failing write aborts the running `mine` call; the error is returned to
/// the caller as [`MiningError::Sink`].
pub trait ResultSink {
    fn write(&mut self, pattern: &[Item], support: u64) -> io::Result<()>;
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn write(&mut self, pattern: &[Item], support: u64) -> io::Result<()> {
        (**self).write(pattern, support)
    }
}

impl ResultSink for Vec<(Vec<Item>, u64)> {
    fn write(&mut self, pattern: &[Item], support: u64) -> io::Result<()> {
        self.push((pattern.to_vec(), support));
        Ok(())
    }
}

/// Collects patterns in memory, in emission order.
#[derive(Debug, Clone, Default)]
pub struct CollectSink {
    patterns: Vec<(Vec<Item>, u64)>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patterns(&self) -> &[(Vec<Item>, u64)] {
        &self.patterns
    }

    pub fn into_patterns(self) -> Vec<(Vec<Item>, u64)> {
        self.patterns
    }

    /// Patterns in ascending lexicographic order.
    pub fn into_sorted(mut self) -> Vec<(Vec<Item>, u64)> {
        self.patterns.sort_unstable();
        self.patterns
    }
}

impl ResultSink for CollectSink {
    fn write(&mut self, pattern: &[Item], support: u64) -> io::Result<()> {
        self.patterns.push((pattern.to_vec(), support));
        Ok(())
    }
}

/// Only counts patterns and keeps the largest support seen.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingSink {
    pub count: u64,
    pub max_support: u64,
}

impl ResultSink for CountingSink {
    fn write(&mut self, _pattern: &[Item], support: u64) -> io::Result<()> {
        self.count += 1;
        self.max_support = self.max_support.max(support);
        Ok(())
    }
}

/// Writes one line per pattern: the items separated by spaces, a tab, and
/// the support.
#[derive(Debug)]
pub struct TextSink<W: Write> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for TextSink<W> {
    fn write(&mut self, pattern: &[Item], support: u64) -> io::Result<()> {
        for (i, item) in pattern.iter().enumerate() {
            if i > 0 {
                self.writer.write_all(b" ")?;
            }
            write!(self.writer, "{}", item)?;
        }
        writeln!(self.writer, "\t{}", support)
    }
}

/// Counters reported by a finished `mine` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MiningStats {
    /// Patterns handed to the sink.
    pub patterns: u64,
    /// Distinct candidate extensions collected while growing patterns.
    pub candidates: u64,
}

/// Sink wrapper used by the engines: maps sink failures and keeps counters.
pub(crate) struct Emitter<'a> {
    sink: &'a mut dyn ResultSink,
    stats: MiningStats,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(sink: &'a mut dyn ResultSink) -> Self {
        Self {
            sink,
            stats: MiningStats::default(),
        }
    }

    pub(crate) fn emit(&mut self, pattern: &[Item], support: u64) -> Result<(), MiningError> {
        log::trace!("pattern {:?} support {}", pattern, support);
        self.sink.write(pattern, support).map_err(MiningError::Sink)?;
        self.stats.patterns += 1;
        Ok(())
    }

    pub(crate) fn examined(&mut self, candidates: usize) {
        self.stats.candidates += candidates as u64;
    }

    pub(crate) fn stats(&self) -> MiningStats {
        self.stats
    }
}

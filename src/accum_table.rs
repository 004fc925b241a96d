//! Accumulation Table: the live-generation recorder.
//!
//! Every entry's pattern only ever grows under bitwise OR within one
//! generation; a generation leaves the AT exactly once, by transfer to the
//! PHT.

use crate::counters::TableCounters;
use crate::pattern::Pattern;
use crate::table::{InsertOutcome, Table};

/// The Accumulation Table.
#[derive(Debug, Clone)]
pub struct AccumTable {
    table: Table<Pattern>,
}

impl AccumTable {
    /// Builds a fully-associative accumulation table of `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        AccumTable {
            table: Table::new(capacity, capacity),
        }
    }

    pub fn contains(&mut self, fingerprint: u64, counters: &mut TableCounters) -> bool {
        self.table.contains(fingerprint, counters)
    }

    pub fn lookup(&mut self, fingerprint: u64, counters: &mut TableCounters) -> Option<Pattern> {
        self.table.lookup(fingerprint, counters)
    }

    /// Writes `pattern` under `fingerprint`, OR-merging with any existing
    /// entry.
    pub fn insert_or_merge(&mut self, fingerprint: u64, pattern: Pattern, counters: &mut TableCounters) -> InsertOutcome {
        let merged = match self.table.lookup(fingerprint, counters) {
            Some(existing) => existing | pattern,
            None => pattern,
        };
        debug_assert_ne!(merged, 0, "accumulation table entries must be nonzero");
        self.table.insert(fingerprint, merged, counters)
    }

    pub fn invalidate(&mut self, fingerprint: u64, counters: &mut TableCounters) {
        self.table.invalidate(fingerprint, counters)
    }

    /// Non-mutating introspection; see [`Table::peek`].
    pub fn peek(&self, fingerprint: u64) -> Option<Pattern> {
        self.table.peek(fingerprint)
    }
}

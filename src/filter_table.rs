//! Filter Table: single-touch staging.
//!
//! Holds regions seen exactly once this generation. Never holds a pattern
//! with popcount greater than one, and never coexists with an Accumulation
//! Table entry for the same fingerprint.

use crate::counters::TableCounters;
use crate::pattern::Pattern;
use crate::table::{InsertOutcome, Table};

/// The Filter Table.
#[derive(Debug, Clone)]
pub struct FilterTable {
    table: Table<Pattern>,
}

impl FilterTable {
    /// Builds a fully-associative filter table of `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        FilterTable {
            table: Table::new(capacity, capacity),
        }
    }

    pub fn contains(&mut self, fingerprint: u64, counters: &mut TableCounters) -> bool {
        self.table.contains(fingerprint, counters)
    }

    pub fn lookup(&mut self, fingerprint: u64, counters: &mut TableCounters) -> Option<Pattern> {
        self.table.lookup(fingerprint, counters)
    }

    pub fn insert(&mut self, fingerprint: u64, pattern: Pattern, counters: &mut TableCounters) -> InsertOutcome {
        debug_assert_eq!(pattern.count_ones(), 1, "filter table entries must have popcount 1");
        self.table.insert(fingerprint, pattern, counters)
    }

    pub fn invalidate(&mut self, fingerprint: u64, counters: &mut TableCounters) {
        self.table.invalidate(fingerprint, counters)
    }

    /// Non-mutating introspection; see [`Table::peek`].
    pub fn peek(&self, fingerprint: u64) -> Option<Pattern> {
        self.table.peek(fingerprint)
    }
}

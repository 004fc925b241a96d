//! Pattern History Table: long-lived memory of completed generations,
//! keyed by trigger fingerprint.

use crate::counters::TableCounters;
use crate::pattern::Pattern;
use crate::table::Table;

/// The Pattern History Table.
#[derive(Debug, Clone)]
pub struct Pht {
    table: Table<Pattern>,
}

impl Pht {
    /// Builds a `entries`-entry, `assoc`-way set-associative PHT.
    pub fn new(entries: usize, assoc: usize) -> Self {
        Pht {
            table: Table::new(entries, assoc),
        }
    }

    /// Called exclusively by the Generation Controller when an AT entry is
    /// closing. Uses the table backend's `insert`.
    pub fn record(&mut self, fingerprint: u64, pattern: Pattern, counters: &mut TableCounters) {
        debug_assert_ne!(pattern, 0, "PHT entries must be nonzero");
        self.table.insert(fingerprint, pattern, counters);
        counters.transfer += 1;
    }

    /// Looks up `fingerprint`; returns the bitwise OR of every live entry
    /// tagged `fingerprint` in its set, or `0` if none exists.
    pub fn predict(&mut self, fingerprint: u64, counters: &mut TableCounters) -> Pattern {
        counters.check += 1;
        match self.table.merged_lookup(fingerprint, |a, b| a | b) {
            Some(pattern) => {
                counters.hit += 1;
                pattern
            }
            None => {
                counters.miss += 1;
                0
            }
        }
    }

    /// Non-mutating introspection: the merged pattern `predict` would
    /// return, without touching recency or counters. See [`Table::peek`].
    pub fn peek_merged(&self, fingerprint: u64) -> Pattern {
        self.table.merged_lookup(fingerprint, |a, b| a | b).unwrap_or(0)
    }
}

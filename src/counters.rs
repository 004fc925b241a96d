//! Telemetry counters.
//!
//! One [`Counters`] per `proc_id`, owned by [`crate::Sms`] in a
//! [`std::collections::HashMap`]. Counters are plain monotonic `u64`
//! increments, reset only by constructing a fresh [`crate::Sms`].

use std::collections::HashMap;

/// Per-table operation outcomes tracked across FT, AT, and PHT.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TableCounters {
    /// Every `lookup`/`contains` call, hit or miss.
    pub check: u64,
    pub hit: u64,
    pub miss: u64,
    pub insert: u64,
    pub update: u64,
    pub invalidate: u64,
    /// AT→PHT generation transfers (PHT counters only).
    pub transfer: u64,
    /// `insert` replaced a live slot whose stored pattern was identical.
    pub same_eviction: u64,
    /// `insert` replaced a live slot whose stored pattern differed.
    pub different_eviction: u64,
    /// `insert` did not evict a different tag's entry: it landed in a free
    /// slot or overwrote its own tag's existing entry.
    pub no_eviction: u64,
}

/// Telemetry for one processor's SMS instance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub filter_table: TableCounters,
    pub accumulation_table: TableCounters,
    pub pattern_history_table: TableCounters,
    pub pattern_overflow: u64,
    pub trigger_access: u64,
    /// Active Generation Table (FT ∪ AT) hit: the access's fingerprint was
    /// already live.
    pub agt_hit: u64,
    /// Active Generation Table miss: the access opened a new generation.
    pub agt_miss: u64,
}

/// Per-`proc_id` telemetry store, owned by [`crate::Sms`].
#[derive(Debug, Default, Clone)]
pub struct CountersByProc {
    by_proc: HashMap<u32, Counters>,
}

impl CountersByProc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a mutable handle to `proc_id`'s counters, creating a
    /// zeroed entry on first use.
    pub fn entry(&mut self, proc_id: u32) -> &mut Counters {
        self.by_proc.entry(proc_id).or_default()
    }

    /// Returns a snapshot of `proc_id`'s counters, or the zero value if
    /// that processor has never been observed.
    pub fn get(&self, proc_id: u32) -> Counters {
        self.by_proc.get(&proc_id).copied().unwrap_or_default()
    }
}

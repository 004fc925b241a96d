//! Table Backend: a uniform tagged, set-associative store shared by the
//! Filter Table, Accumulation Table, and Pattern History Table.
//!
//! A single concrete [`Table`] type is parameterized at construction (not
//! at the type level) by its capacity and associativity, since table sizes
//! are run-time configuration rather than compile-time constants.
//! Configuring `associativity == capacity` (one set) yields the "tagged,
//! fully associative" FT/AT shape; any smaller associativity set-indexes by
//! a hash of the tag, yielding the PHT's multi-way shape. Hashing rather
//! than a plain `tag % num_sets` matters because tags are not uniformly
//! distributed bit patterns: a `region_base` fingerprint, for instance, is
//! always a multiple of the region size, so its low bits are structurally
//! zero and a raw modulo would collapse most sets.

use arrayvec::ArrayVec;

use crate::counters::TableCounters;

/// Upper bound on ways-per-set. Large enough to cover every default table
/// size (FT 32-way, AT 64-way, PHT 4-way), all fully tagged within one set
/// when `associativity == capacity`.
pub(crate) const MAX_ASSOC: usize = 64;

/// Spreads a tag's bits before set-indexing (splitmix64's finalizer), so
/// sets fill evenly even when tags share long runs of structurally
/// constant bits.
fn mix(tag: u64) -> u64 {
    let mut z = tag.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Outcome of a [`Table::insert`], for telemetry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The slot written was previously empty.
    Fresh,
    /// The slot written held a different tag whose pattern happened to be
    /// identical to the new one.
    ReplacedSamePattern,
    /// The slot written held a different tag with a different pattern.
    ReplacedDifferentPattern,
}

#[derive(Debug, Clone, Copy)]
struct Slot<V> {
    tag: u64,
    value: V,
    /// Logical timestamp; higher is more recently used. `0` means "never
    /// touched", used to distinguish empty slots without an `Option` layer.
    recency: u64,
}

/// A tagged, set-associative table of `u64`-keyed values with per-set LRU
/// replacement.
#[derive(Debug, Clone)]
pub struct Table<V> {
    sets: Vec<ArrayVec<Slot<V>, MAX_ASSOC>>,
    associativity: usize,
    clock: u64,
}

impl<V: Copy + PartialEq> Table<V> {
    /// Builds a table with `capacity` total entries split into
    /// `capacity / associativity` sets of `associativity` ways each.
    ///
    /// `capacity` must be a positive multiple of `associativity`, and
    /// `associativity` must not exceed [`MAX_ASSOC`]; both are guaranteed by
    /// [`crate::config::SmsConfig::validated`] for the tables it describes.
    pub fn new(capacity: usize, associativity: usize) -> Self {
        assert!(capacity > 0 && associativity > 0, "table capacity/associativity must be nonzero");
        assert!(associativity <= MAX_ASSOC, "associativity exceeds MAX_ASSOC");
        assert_eq!(capacity % associativity, 0, "capacity must be a multiple of associativity");
        let num_sets = capacity / associativity;
        Table {
            sets: (0..num_sets).map(|_| ArrayVec::new()).collect(),
            associativity,
            clock: 0,
        }
    }

    fn set_index(&self, tag: u64) -> usize {
        (mix(tag) as usize) % self.sets.len()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Returns `true` if `tag` has a live entry.
    pub fn contains(&mut self, tag: u64, counters: &mut TableCounters) -> bool {
        counters.check += 1;
        let idx = self.set_index(tag);
        let present = self.sets[idx].iter().any(|s| s.tag == tag);
        if present {
            counters.hit += 1;
        } else {
            counters.miss += 1;
        }
        present
    }

    /// Looks up `tag`, returning its stored value and touching LRU
    /// recency on hit. Does not update recency of any other slot.
    pub fn lookup(&mut self, tag: u64, counters: &mut TableCounters) -> Option<V> {
        counters.check += 1;
        let idx = self.set_index(tag);
        let recency = self.clock + 1;
        let set = &mut self.sets[idx];
        if let Some(slot) = set.iter_mut().find(|s| s.tag == tag) {
            slot.recency = recency;
            self.clock = recency;
            counters.hit += 1;
            Some(slot.value)
        } else {
            counters.miss += 1;
            None
        }
    }

    /// Writes `value` under `tag`, evicting the LRU victim of the target
    /// set when it is full. Updates recency for the written slot only.
    pub fn insert(&mut self, tag: u64, value: V, counters: &mut TableCounters) -> InsertOutcome {
        let idx = self.set_index(tag);
        let recency = self.tick();
        let assoc = self.associativity;
        let set = &mut self.sets[idx];

        if let Some(slot) = set.iter_mut().find(|s| s.tag == tag) {
            slot.value = value;
            slot.recency = recency;
            counters.insert += 1;
            counters.update += 1;
            counters.no_eviction += 1;
            return InsertOutcome::Fresh;
        }

        if set.len() < assoc {
            set.push(Slot { tag, value, recency });
            counters.insert += 1;
            counters.no_eviction += 1;
            return InsertOutcome::Fresh;
        }

        // Full: evict the least-recently-used slot in this set. `assoc > 0`
        // (checked at construction) and `set.len() >= assoc` here, so the
        // set is nonempty and position 0 is always a valid starting victim.
        let mut victim_pos = 0;
        for (i, slot) in set.iter().enumerate().skip(1) {
            if slot.recency < set[victim_pos].recency {
                victim_pos = i;
            }
        }
        let victim = set[victim_pos];
        set[victim_pos] = Slot { tag, value, recency };
        counters.insert += 1;
        if victim.value == value {
            counters.same_eviction += 1;
            InsertOutcome::ReplacedSamePattern
        } else {
            counters.different_eviction += 1;
            InsertOutcome::ReplacedDifferentPattern
        }
    }

    /// Clears `tag`'s entry if present. A no-op otherwise. Never touches
    /// the recency of any other slot.
    pub fn invalidate(&mut self, tag: u64, counters: &mut TableCounters) {
        let idx = self.set_index(tag);
        let set = &mut self.sets[idx];
        if let Some(pos) = set.iter().position(|s| s.tag == tag) {
            set.swap_remove(pos);
            counters.invalidate += 1;
        }
    }

    /// Non-mutating lookup for introspection/diagnostics: does not touch
    /// recency or counters. The core itself never calls this on a
    /// host-reachable path; it exists so a host (or a test) can inspect
    /// table contents without perturbing the LRU state it is inspecting.
    pub fn peek(&self, tag: u64) -> Option<V> {
        let idx = self.set_index(tag);
        self.sets[idx].iter().find(|s| s.tag == tag).map(|s| s.value)
    }

    /// Returns the bitwise OR of every live entry tagged `tag` in its set,
    /// or `None` if none exists. With this implementation's found-or-replace
    /// `insert`, at most one entry per tag ever lives in a set, so this
    /// degenerates to a plain lookup that
    /// does not disturb recency — callers that want recency touched should
    /// use [`Table::lookup`] instead. Kept generic (loop + fold) so it
    /// remains correct if a future variant of `insert` allowed duplicate
    /// tags within one set.
    pub fn merged_lookup<F>(&self, tag: u64, merge: F) -> Option<V>
    where
        F: Fn(V, V) -> V,
    {
        let idx = self.set_index(tag);
        self.sets[idx]
            .iter()
            .filter(|s| s.tag == tag)
            .map(|s| s.value)
            .reduce(merge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters() -> TableCounters {
        TableCounters::default()
    }

    #[test]
    fn insert_then_lookup_round_trips() {
        let mut t: Table<u64> = Table::new(4, 4);
        let mut c = counters();
        assert_eq!(t.insert(0x10, 0b1, &mut c), InsertOutcome::Fresh);
        assert_eq!(t.lookup(0x10, &mut c), Some(0b1));
        assert_eq!(c.hit, 1);
    }

    #[test]
    fn lookup_miss_does_not_panic_or_mutate() {
        let mut t: Table<u64> = Table::new(4, 4);
        let mut c = counters();
        assert_eq!(t.lookup(0x99, &mut c), None);
        assert_eq!(c.miss, 1);
    }

    #[test]
    fn invalidate_is_noop_when_absent() {
        let mut t: Table<u64> = Table::new(4, 4);
        let mut c = counters();
        t.invalidate(0x10, &mut c);
        assert_eq!(c.invalidate, 0);
    }

    #[test]
    fn lru_eviction_picks_least_recently_used_in_set() {
        // One set (associativity == capacity) so all tags collide.
        let mut t: Table<u64> = Table::new(2, 2);
        let mut c = counters();
        t.insert(1, 10, &mut c);
        t.insert(2, 20, &mut c);
        // Touch 1 so 2 becomes the LRU victim.
        t.lookup(1, &mut c);
        t.insert(3, 30, &mut c);
        assert_eq!(t.lookup(2, &mut c), None, "2 should have been evicted");
        assert_eq!(t.lookup(1, &mut c), Some(10));
        assert_eq!(t.lookup(3, &mut c), Some(30));
    }

    #[test]
    fn insert_outcome_distinguishes_same_and_different_pattern_eviction() {
        let mut t: Table<u64> = Table::new(1, 1);
        let mut c = counters();
        assert_eq!(t.insert(1, 0xaa, &mut c), InsertOutcome::Fresh);
        assert_eq!(t.insert(2, 0xaa, &mut c), InsertOutcome::ReplacedSamePattern);
        assert_eq!(t.insert(3, 0xbb, &mut c), InsertOutcome::ReplacedDifferentPattern);
    }

    #[test]
    fn invalidate_does_not_touch_other_slots_recency() {
        let mut t: Table<u64> = Table::new(2, 2);
        let mut c = counters();
        t.insert(1, 10, &mut c);
        t.insert(2, 20, &mut c);
        let clock_before = t.clock;
        t.invalidate(1, &mut c);
        assert_eq!(t.clock, clock_before, "invalidate must not advance the recency clock");
    }

    #[test]
    fn merged_lookup_returns_none_when_absent() {
        let t: Table<u64> = Table::new(4, 4);
        assert_eq!(t.merged_lookup(0x10, |a, b| a | b), None);
    }

    #[test]
    fn region_aligned_tags_spread_across_more_than_two_sets() {
        // Regression for a `set_index` that used to do `tag % num_sets`
        // directly: region-aligned tags (multiples of 2048) all share the
        // same low 11 bits, which used to collapse a 16-set table down to
        // 2 live sets.
        let mut t: Table<u64> = Table::new(64, 4);
        let mut c = counters();
        let region_size = 2048u64;
        for i in 0..64u64 {
            t.insert(i * region_size, 1, &mut c);
        }
        let occupied = t.sets.iter().filter(|s| !s.is_empty()).count();
        assert!(occupied > 2, "region-aligned tags must not collapse onto a couple of sets, got {occupied}");
    }
}

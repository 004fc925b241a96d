//! Generation Controller: drives FT↔AT promotion, AT→PHT transfer on
//! generation end, and PHT lookup on trigger. This is the predictor's
//! outward API to the host.

use log::{debug, trace};

use crate::accum_table::AccumTable;
use crate::config::{FingerprintMode, SmsConfig};
use crate::counters::Counters;
use crate::error::ConfigError;
use crate::filter_table::FilterTable;
use crate::host::DcacheDescriptor;
use crate::pattern::{pattern_of, region_base, Addr, Pattern};
use crate::pht::Pht;
use crate::stream;

/// Computes the fingerprint `K` identifying a generation.
///
/// `pc` is read only under the `fingerprint_pc_plus_offset` feature; the
/// default `region_base` strategy ignores it.
fn fingerprint(pc: Addr, addr: Addr, region_size: u64) -> u64 {
    match FingerprintMode::compiled() {
        FingerprintMode::RegionBase => region_base(addr, region_size),
        FingerprintMode::PcPlusOffset => {
            let offset = addr & (region_size - 1);
            pc.wrapping_add(offset)
        }
    }
}

/// Recovers the fingerprint `K` of the generation an evicted line belonged
/// to, for closing it out on eviction.
///
/// Under `RegionBase` this is exact: the fingerprint is a pure function of
/// the address. Under `PcPlusOffset` it is not recoverable here at all — `K`
/// also depends on the triggering instruction's `pc`, which a cache eviction
/// callback has no way to know, so this returns `None` rather than guessing
/// at the wrong key. A generation opened under that mode can still be
/// reclaimed later by LRU eviction from the AT/FT themselves; it just never
/// closes (and therefore never reaches the PHT) via `on_dcache_insert`.
fn fingerprint_for_close(evicted_addr: Addr, region_size: u64) -> Option<u64> {
    match FingerprintMode::compiled() {
        FingerprintMode::RegionBase => Some(region_base(evicted_addr, region_size)),
        FingerprintMode::PcPlusOffset => None,
    }
}

/// The SMS predictor core: owns the Filter, Accumulation, and Pattern
/// History Tables and the host's dcache handle, and drives the generation
/// lifecycle across them.
pub struct Sms<D: DcacheDescriptor> {
    config: SmsConfig,
    line_size: u64,
    ft: FilterTable,
    at: AccumTable,
    pht: Pht,
    counters: crate::counters::CountersByProc,
    dcache: D,
}

impl<D: DcacheDescriptor> Sms<D> {
    /// Validates `config` against the host dcache's line size and builds a
    /// fresh predictor with empty tables and zeroed counters.
    pub fn new(dcache: D, config: SmsConfig) -> Result<Self, ConfigError> {
        let line_size = dcache.line_size();
        let config = config.validated(line_size)?;
        debug!(
            "sms: initialized with region_size={} line_size={line_size} fingerprint_mode={:?}",
            config.region_size,
            config.fingerprint_mode(),
        );
        Ok(Sms {
            config,
            line_size,
            ft: FilterTable::new(config.ft_entries),
            at: AccumTable::new(config.at_entries),
            pht: Pht::new(config.pht_entries, config.pht_assoc),
            counters: crate::counters::CountersByProc::new(),
            dcache,
        })
    }

    /// Read-only access to the host dcache descriptor, e.g. for a host
    /// that wants to inspect residency alongside SMS's own state.
    pub fn dcache(&self) -> &D {
        &self.dcache
    }

    /// Snapshot of `proc_id`'s telemetry counters.
    pub fn counters(&self, proc_id: u32) -> Counters {
        self.counters.get(proc_id)
    }

    /// Non-mutating introspection of the Filter Table's current entry for
    /// fingerprint `k`, if any.
    pub fn peek_filter_table(&self, k: u64) -> Option<Pattern> {
        self.ft.peek(k)
    }

    /// Non-mutating introspection of the Accumulation Table's current entry
    /// for fingerprint `k`, if any.
    pub fn peek_accum_table(&self, k: u64) -> Option<Pattern> {
        self.at.peek(k)
    }

    /// Non-mutating introspection of the Pattern History Table's merged
    /// prediction for fingerprint `k` (`0` if absent).
    pub fn peek_pattern_history(&self, k: u64) -> Pattern {
        self.pht.peek_merged(k)
    }

    /// Notifies the predictor of a data-cache access.
    ///
    /// `pc` is the triggering instruction's address; the L1 data cache
    /// itself, the simulator's op/instruction descriptor, and the physical
    /// prefetch issue path are all external collaborators this core does not
    /// model beyond the narrow [`DcacheDescriptor`] surface.
    pub fn on_dcache_access(&mut self, pc: Addr, proc_id: u32, addr: Addr) {
        let k = fingerprint(pc, addr, self.config.region_size);
        let p = pattern_of(addr, self.config.region_size, self.line_size, self.counters.entry(proc_id));

        let in_ft = self.ft.contains(k, &mut self.counters.entry(proc_id).filter_table);
        let in_at = self.at.contains(k, &mut self.counters.entry(proc_id).accumulation_table);
        debug_assert!(!(in_ft && in_at), "a fingerprint must never be resident in both FT and AT");

        if in_ft || in_at {
            self.counters.entry(proc_id).agt_hit += 1;
            trace!("sms: proc {proc_id} access {addr:#x} fingerprint {k:#x} is an active generation");
            if in_at {
                self.at.insert_or_merge(k, p, &mut self.counters.entry(proc_id).accumulation_table);
            } else {
                self.filter_table_access(proc_id, k, p);
            }
            return;
        }

        // Trigger access: predict -> stream -> open FT, in that order, so
        // the trigger access itself can never be mistaken for the "second
        // access" that promotes FT->AT.
        self.counters.entry(proc_id).agt_miss += 1;
        self.counters.entry(proc_id).trigger_access += 1;
        trace!("sms: proc {proc_id} trigger access {addr:#x} fingerprint {k:#x}");

        let base = region_base(addr, self.config.region_size);
        let predicted = self.pht.predict(k, &mut self.counters.entry(proc_id).pattern_history_table);
        // Don't re-request the line the trigger access itself is already
        // demand-fetching.
        let to_stream = predicted & !p;
        if to_stream != 0 {
            let streamed = stream::stream(&mut self.dcache, proc_id, base, to_stream, self.line_size);
            debug!(
                "sms: proc {proc_id} predicted {predicted:#x} for fingerprint {k:#x}, streaming {} lines",
                streamed.len()
            );
            // Snapshot evictions before acting on any of them: `stream`
            // itself never touches FT/AT/PHT, so there is nothing to
            // capture but the plain eviction list.
            let evictions: Vec<Addr> = streamed.iter().filter_map(|s| s.evicted).collect();
            for evicted in evictions {
                self.on_dcache_insert(proc_id, None, Some(evicted));
            }
        }

        self.ft.insert(k, p, &mut self.counters.entry(proc_id).filter_table);
    }

    /// The Filter Table's own access logic: single-touch promotion to AT.
    fn filter_table_access(&mut self, proc_id: u32, k: u64, p: Pattern) {
        match self.ft.lookup(k, &mut self.counters.entry(proc_id).filter_table) {
            None => {
                // Shouldn't normally happen here (the caller already
                // checked `contains`), but stay total: treat it as opening
                // a fresh generation rather than panicking.
                self.ft.insert(k, p, &mut self.counters.entry(proc_id).filter_table);
            }
            Some(q) => {
                if p | q == q {
                    // Same line re-accessed: leave FT unchanged (recency
                    // was already touched by `lookup`).
                    return;
                }
                // Second distinct line: promote FT -> AT.
                let merged = p | q;
                trace!("sms: proc {proc_id} promoting fingerprint {k:#x} {q:#x} -> {merged:#x} (FT -> AT)");
                self.at.insert_or_merge(k, merged, &mut self.counters.entry(proc_id).accumulation_table);
                self.ft.invalidate(k, &mut self.counters.entry(proc_id).filter_table);
            }
        }
    }

    /// Notifies the predictor of a data-cache line install, and the line
    /// (if any) it replaced.
    ///
    /// `inserted_addr` is accepted for API symmetry but is not otherwise
    /// consulted: SMS only reacts to the evicted side of a fill.
    pub fn on_dcache_insert(&mut self, proc_id: u32, _inserted_addr: Option<Addr>, evicted_addr: Option<Addr>) {
        let Some(evicted_addr) = evicted_addr else {
            return;
        };
        let Some(k_ev) = fingerprint_for_close(evicted_addr, self.config.region_size) else {
            trace!(
                "sms: proc {proc_id} cannot resolve a fingerprint for evicted {evicted_addr:#x} \
                 under the pc_plus_offset strategy; generation close on eviction skipped"
            );
            return;
        };

        if let Some(pattern) = self.at.lookup(k_ev, &mut self.counters.entry(proc_id).accumulation_table) {
            // `pattern` is captured into this local before calling into the
            // PHT, so a hypothetical PHT eviction cascade could never
            // observe a half-transferred AT entry.
            trace!("sms: proc {proc_id} closing generation {k_ev:#x}: AT -> PHT ({pattern:#x})");
            self.pht.record(k_ev, pattern, &mut self.counters.entry(proc_id).pattern_history_table);
            self.at.invalidate(k_ev, &mut self.counters.entry(proc_id).accumulation_table);
            return;
        }

        if self.ft.contains(k_ev, &mut self.counters.entry(proc_id).filter_table) {
            trace!("sms: proc {proc_id} discarding single-touch generation {k_ev:#x}");
            self.ft.invalidate(k_ev, &mut self.counters.entry(proc_id).filter_table);
        }
    }
}

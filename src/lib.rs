//! Spatial Memory Streaming (SMS) prefetcher core.
//!
//! A hardware-style predictor that learns, per code region, which cache
//! blocks inside a fixed-size spatial region of memory are accessed
//! together during a single "generation", and on a later trigger access to
//! the same region prefetches that full set of blocks into the L1 data
//! cache.
//!
//! This crate is a plug-in for a CPU microarchitectural simulator: the
//! generic set-associative cache library the real Pattern History Table
//! would be built on, the simulator's op/instruction descriptor and
//! statistics facilities, the L1 data cache itself, and the physical
//! prefetch issue path to memory are all external collaborators. This
//! crate specifies and implements only the predictor's own state — the
//! [`Table`](table::Table) backend, the three tables built on it
//! ([`FilterTable`](filter_table::FilterTable),
//! [`AccumTable`](accum_table::AccumTable), [`Pht`](pht::Pht)), and the
//! [`Sms`](controller::Sms) generation controller that ties them together.
//!
//! # Host integration
//!
//! A host wires itself in by implementing [`host::DcacheDescriptor`] and
//! driving the three stable entry points: [`sms_init`],
//! [`sms_on_dcache_access`], and [`sms_on_dcache_insert`].

pub mod accum_table;
pub mod config;
pub mod controller;
pub mod counters;
pub mod error;
pub mod filter_table;
pub mod host;
pub mod pattern;
pub mod pht;
pub mod table;

mod stream;

pub use config::{FingerprintMode, SmsConfig};
pub use controller::Sms;
pub use counters::Counters;
pub use error::ConfigError;
pub use host::DcacheDescriptor;
pub use pattern::{Addr, Pattern};
pub use stream::StreamedLine;

/// Builds a fresh predictor over `dcache`, validating `config` against the
/// host's reported line size.
pub fn sms_init<D: DcacheDescriptor>(dcache: D, config: SmsConfig) -> Result<Sms<D>, ConfigError> {
    Sms::new(dcache, config)
}

/// Notifies the predictor of a data-cache access.
///
/// `pc` is the accessing instruction's address; `line_addr` is the accessed
/// data address.
pub fn sms_on_dcache_access<D: DcacheDescriptor>(sms: &mut Sms<D>, pc: Addr, proc_id: u32, line_addr: Addr) {
    sms.on_dcache_access(pc, proc_id, line_addr);
}

/// Notifies the predictor of a data-cache line install, and the line (if
/// any) it replaced.
pub fn sms_on_dcache_insert<D: DcacheDescriptor>(
    sms: &mut Sms<D>,
    proc_id: u32,
    line_addr: Addr,
    replaced_line_addr: Option<Addr>,
) {
    sms.on_dcache_insert(proc_id, Some(line_addr), replaced_line_addr);
}

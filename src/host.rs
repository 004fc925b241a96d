//! Host-facing dcache interface.
//!
//! The L1 data cache itself, the simulator's op/instruction descriptor, and
//! the physical prefetch issue path are all external collaborators. This
//! module specifies only the narrow surface SMS needs from them: the
//! cache's geometry, and a callback to install a prefetched line.

use crate::pattern::Addr;

/// Everything the SMS core needs to know about, and do to, the host's L1
/// data cache.
pub trait DcacheDescriptor {
    /// Size in bytes of one cache line.
    fn line_size(&self) -> u64;

    /// Mask selecting the in-line offset bits of an address. Unused by the
    /// core directly (region/line indexing is computed from `line_size` and
    /// `region_size` instead), but part of the stable descriptor surface
    /// since hosts already compute it for their own cache model and some
    /// fingerprint strategies (`pc_plus_offset`) consume it.
    fn offset_mask(&self) -> u64;

    /// Installs `addr` into the dcache as a hardware-prefetched line for
    /// `proc_id`, returning the address evicted to make room, if any.
    ///
    /// Must not install a line already present in the dcache: implementations
    /// are expected to no-op (returning `None`) on an already-resident line
    /// rather than re-fetching it.
    fn install_prefetch(&mut self, proc_id: u32, addr: Addr) -> Option<Addr>;
}

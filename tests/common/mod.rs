//! Shared test fixtures: a minimal in-memory dcache fake implementing
//! [`sms_core::DcacheDescriptor`], used by both the scenario (§8 S1-S6) and
//! property (§8 P1-P6) test suites.

use std::collections::HashSet;

use sms_core::{Addr, DcacheDescriptor};

/// Enables `log` output under `cargo test -- --nocapture` with `RUST_LOG`
/// set; safe to call from every test, idempotent.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A fixed-capacity, insertion-order-evicting dcache fake. Large enough by
/// default that tests don't trip unintended evictions unless they ask to.
pub struct FakeDcache {
    line_size: u64,
    capacity: usize,
    resident: HashSet<Addr>,
    order: Vec<Addr>,
    pub installs: Vec<Addr>,
}

impl FakeDcache {
    pub fn new(line_size: u64) -> Self {
        Self::with_capacity(line_size, usize::MAX)
    }

    pub fn with_capacity(line_size: u64, capacity: usize) -> Self {
        FakeDcache {
            line_size,
            capacity,
            resident: HashSet::new(),
            order: Vec::new(),
            installs: Vec::new(),
        }
    }

    pub fn is_resident(&self, addr: Addr) -> bool {
        self.resident.contains(&addr)
    }
}

impl DcacheDescriptor for FakeDcache {
    fn line_size(&self) -> u64 {
        self.line_size
    }

    fn offset_mask(&self) -> u64 {
        self.line_size - 1
    }

    fn install_prefetch(&mut self, _proc_id: u32, addr: Addr) -> Option<Addr> {
        self.installs.push(addr);
        if self.resident.contains(&addr) {
            return None;
        }
        let evicted = if self.order.len() >= self.capacity && self.capacity > 0 {
            let victim = self.order.remove(0);
            self.resident.remove(&victim);
            Some(victim)
        } else {
            None
        };
        self.resident.insert(addr);
        self.order.push(addr);
        evicted
    }
}

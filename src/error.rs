//! Typed, closed error set for the one place this crate can fail:
//! constructing a [`crate::config::SmsConfig`].
//!
//! Every other condition a host might call an "error" (table misses,
//! overflowing bit indices, unmapped eviction addresses) is modeled as a
//! normal return value rather than an `Err`: the predictor is advisory, and
//! has no user-visible failure surface beyond rejecting a bad configuration.

use std::fmt;

/// Reasons [`crate::config::SmsConfig::validated`] can refuse to start.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `region_size` was not a power of two.
    RegionSizeNotPowerOfTwo { region_size: u64 },
    /// `region_size / line_size` would require a bitmap wider than the 64
    /// bits a [`crate::pattern::Pattern`] can hold.
    BitmapWidthTooWide { bit_width: u64 },
    /// A table was configured with zero capacity or zero associativity,
    /// which can never hold an entry.
    ZeroCapacityTable { table: &'static str },
    /// A fully-associative table (one set, `associativity == capacity`) was
    /// configured wider than the backend's per-set slot storage allows.
    FullyAssociativeTableTooWide { table: &'static str, entries: usize, max: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::RegionSizeNotPowerOfTwo { region_size } => {
                write!(f, "region_size ({region_size}) must be a power of two")
            }
            ConfigError::BitmapWidthTooWide { bit_width } => write!(
                f,
                "bitmap width {bit_width} (region_size / line_size) exceeds the 64-bit pattern limit"
            ),
            ConfigError::ZeroCapacityTable { table } => {
                write!(f, "{table} must have a nonzero capacity and associativity")
            }
            ConfigError::FullyAssociativeTableTooWide { table, entries, max } => {
                write!(f, "{table} has {entries} entries but a fully associative table cannot exceed {max}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

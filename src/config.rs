//! Configuration surface.
//!
//! `SmsConfig` is a plain struct rather than a builder: the option set is
//! small and fixed, so `SmsConfig { region_size: 4096, ..Default::default() }`
//! reads better than a multi-step builder DSL. Validation happens once, at
//! [`SmsConfig::validated`], which refuses to hand back a runnable
//! configuration until its checks pass.

use crate::error::ConfigError;
use crate::table::MAX_ASSOC;

/// Which address is hashed into a generation's fingerprint `K`.
///
/// This is documented as configuration for introspection and logging, but
/// the choice is actually fixed at compile time via the
/// `fingerprint_pc_plus_offset` Cargo feature; [`SmsConfig::default`] always
/// reports whichever mode that feature selects.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FingerprintMode {
    /// `K = PC + offset_within_region(A)`.
    PcPlusOffset,
    /// `K = region_base(A)`.
    RegionBase,
}

impl FingerprintMode {
    /// The mode baked in by the active Cargo feature set.
    pub const fn compiled() -> Self {
        if cfg!(feature = "fingerprint_pc_plus_offset") {
            FingerprintMode::PcPlusOffset
        } else {
            FingerprintMode::RegionBase
        }
    }
}

/// SMS predictor configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SmsConfig {
    /// Width of a spatial region, in bytes. Must be a power of two.
    pub region_size: u64,
    /// Filter Table capacity (tagged, fully associative).
    pub ft_entries: usize,
    /// Accumulation Table capacity (tagged, fully associative).
    pub at_entries: usize,
    /// Pattern History Table total entry count.
    pub pht_entries: usize,
    /// Pattern History Table associativity (ways per set).
    pub pht_assoc: usize,
}

impl Default for SmsConfig {
    fn default() -> Self {
        SmsConfig {
            region_size: 2048,
            ft_entries: 32,
            at_entries: 64,
            pht_entries: 16_384,
            pht_assoc: 4,
        }
    }
}

impl SmsConfig {
    /// Reports the fingerprint strategy this build was compiled with.
    ///
    /// Always equal to [`FingerprintMode::compiled`]; present on the config
    /// so hosts can log the active mode alongside the rest of their setup.
    pub const fn fingerprint_mode(&self) -> FingerprintMode {
        FingerprintMode::compiled()
    }

    /// The dcache line size this config was (or will be) validated against.
    /// Stored separately from the config because it comes from the host's
    /// dcache descriptor, not from SMS's own option set.
    pub fn bit_width(&self, line_size: u64) -> u64 {
        self.region_size / line_size
    }

    /// Validates this configuration against a host-supplied dcache line
    /// size, returning it unchanged on success. Failures here are the only
    /// way this crate reports an error; they are returned from `sms_init`,
    /// never panicked.
    pub fn validated(self, line_size: u64) -> Result<Self, ConfigError> {
        if !self.region_size.is_power_of_two() {
            return Err(ConfigError::RegionSizeNotPowerOfTwo {
                region_size: self.region_size,
            });
        }
        let bit_width = self.bit_width(line_size);
        if bit_width > 64 {
            return Err(ConfigError::BitmapWidthTooWide { bit_width });
        }
        if self.ft_entries == 0 {
            return Err(ConfigError::ZeroCapacityTable { table: "filter table" });
        }
        if self.at_entries == 0 {
            return Err(ConfigError::ZeroCapacityTable {
                table: "accumulation table",
            });
        }
        // FT and AT are always built fully associative (one set spanning
        // the whole table), so their entry count doubles as their
        // associativity and must fit the backend's per-set slot storage.
        if self.ft_entries > MAX_ASSOC {
            return Err(ConfigError::FullyAssociativeTableTooWide {
                table: "filter table",
                entries: self.ft_entries,
                max: MAX_ASSOC,
            });
        }
        if self.at_entries > MAX_ASSOC {
            return Err(ConfigError::FullyAssociativeTableTooWide {
                table: "accumulation table",
                entries: self.at_entries,
                max: MAX_ASSOC,
            });
        }
        if self.pht_entries == 0 || self.pht_assoc == 0 {
            return Err(ConfigError::ZeroCapacityTable {
                table: "pattern history table",
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates_against_default_line_size() {
        assert!(SmsConfig::default().validated(64).is_ok());
    }

    #[test]
    fn rejects_non_power_of_two_region_size() {
        let cfg = SmsConfig {
            region_size: 3000,
            ..Default::default()
        };
        assert_eq!(
            cfg.validated(64),
            Err(ConfigError::RegionSizeNotPowerOfTwo { region_size: 3000 })
        );
    }

    #[test]
    fn rejects_bitmap_wider_than_64_bits() {
        let cfg = SmsConfig {
            region_size: 1 << 20,
            ..Default::default()
        };
        // bit_width = 2^20 / 64 = 16384 > 64
        assert_eq!(
            cfg.validated(64),
            Err(ConfigError::BitmapWidthTooWide { bit_width: 16_384 })
        );
    }

    #[test]
    fn rejects_zero_capacity_tables() {
        let cfg = SmsConfig {
            ft_entries: 0,
            ..Default::default()
        };
        assert_eq!(
            cfg.validated(64),
            Err(ConfigError::ZeroCapacityTable { table: "filter table" })
        );
    }

    #[test]
    fn rejects_fully_associative_table_wider_than_max_assoc() {
        let cfg = SmsConfig {
            at_entries: 128,
            ..Default::default()
        };
        assert_eq!(
            cfg.validated(64),
            Err(ConfigError::FullyAssociativeTableTooWide {
                table: "accumulation table",
                entries: 128,
                max: MAX_ASSOC,
            })
        );
    }
}

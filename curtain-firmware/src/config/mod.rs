//! Firmware configuration
//!
//! Board-level settings come from the embedded `curtain.toml`. User
//! settings (away distance, automation, remote codes) are separate and live
//! in the emulated EEPROM.

mod toml;

use defmt::*;

use curtain_core::config::CurtainConfig;

pub use self::toml::{parse_config, ParseError};

/// Everything the firmware reads from `curtain.toml`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareConfig {
    /// Board-agnostic tuning
    pub curtain: CurtainConfig,
    /// Spool direction that opens the curtain
    pub open_clockwise: bool,
    /// Thermistor divider pull-up in ohms
    pub ntc_pullup_ohms: u32,
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        Self {
            curtain: CurtainConfig::default(),
            open_clockwise: true,
            ntc_pullup_ohms: 10_000,
        }
    }
}

/// Parse the embedded configuration, falling back to defaults
pub fn load(input: &str) -> FirmwareConfig {
    match parse_config(input) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            // Only reachable if curtain.toml slipped past build-time validation
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            FirmwareConfig::default()
        }
    }
}

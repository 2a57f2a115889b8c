//! Hardware and behaviour configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Steps per output revolution (28BYJ-48 in half-step mode)
pub const DEFAULT_TOTAL_STEPS: u32 = 4096;

/// Idle time after the last settings edit before writing to storage
pub const DEFAULT_WRITE_DELAY_MS: u32 = 5000;

/// Time a button state must hold before it is accepted
pub const DEFAULT_BUTTON_DEBOUNCE_MS: u32 = 30;

/// Light sensor thresholds and debounce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LightConfig {
    /// Readings below this are dark
    pub dark_threshold: u16,
    /// Width of the dusk band above the dark threshold
    pub dusk_gap: u16,
    /// Readings closer than this to the last considered reading are ignored
    pub noise_gap: u16,
    /// Time a new phase must hold before it is accepted
    pub phase_delay_ms: u32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            dark_threshold: 220,
            dusk_gap: 40,
            noise_gap: 4,
            phase_delay_ms: 2000,
        }
    }
}

impl LightConfig {
    /// Readings above this are light
    pub fn light_threshold(&self) -> u16 {
        self.dark_threshold.saturating_add(self.dusk_gap)
    }
}

/// Curtain controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurtainConfig {
    /// Motor steps per output revolution
    pub total_steps: u32,
    /// Settings write coalescing delay in ms
    pub write_delay_ms: u32,
    /// Button debounce delay in ms
    pub button_debounce_ms: u32,
    /// Light classification
    pub light: LightConfig,
    /// Temperature above which automation closes the curtain (°C)
    pub hot_threshold_c: i16,
    /// Maximum opening travel while seeking the home switch
    pub homing_travel_steps: u32,
    /// Away distance used before any setting has been stored (0 = unbounded)
    pub default_away: u32,
}

impl Default for CurtainConfig {
    fn default() -> Self {
        Self {
            total_steps: DEFAULT_TOTAL_STEPS,
            write_delay_ms: DEFAULT_WRITE_DELAY_MS,
            button_debounce_ms: DEFAULT_BUTTON_DEBOUNCE_MS,
            light: LightConfig::default(),
            hot_threshold_c: 28,
            homing_travel_steps: DEFAULT_TOTAL_STEPS * 10,
            default_away: 0,
        }
    }
}

impl CurtainConfig {
    /// Size of a nudge move (a quarter revolution)
    pub fn quarter_turn(&self) -> u32 {
        self.total_steps / 4
    }

    /// Check the configuration for values the controller cannot work with
    pub fn is_valid(&self) -> bool {
        self.total_steps >= 4
            && self.homing_travel_steps > 0
            && self.homing_travel_steps <= i32::MAX as u32
            && self.default_away <= i32::MAX as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CurtainConfig::default();
        assert!(config.is_valid());
        assert_eq!(config.quarter_turn(), 1024);
        assert_eq!(config.write_delay_ms, 5000);
    }

    #[test]
    fn test_light_threshold() {
        let light = LightConfig::default();
        assert_eq!(light.light_threshold(), 260);

        let saturated = LightConfig {
            dark_threshold: u16::MAX - 1,
            ..LightConfig::default()
        };
        assert_eq!(saturated.light_threshold(), u16::MAX);
    }

    #[test]
    fn test_invalid_config() {
        let config = CurtainConfig {
            total_steps: 2,
            ..CurtainConfig::default()
        };
        assert!(!config.is_valid());

        let config = CurtainConfig {
            homing_travel_steps: 0,
            ..CurtainConfig::default()
        };
        assert!(!config.is_valid());
    }
}

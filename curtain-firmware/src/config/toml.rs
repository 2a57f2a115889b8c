//! Simple TOML parser for the curtain configuration
//!
//! This is a minimal TOML parser that handles only the subset used by
//! `curtain.toml`. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (integer, boolean)
//! - [section] headers
//! - Comments (# ...)
//! - Underscore digit separators (40_960)
//!
//! Unknown keys inside a known section are ignored.

use core::str::FromStr;

use super::FirmwareConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is not `key = value`
    InvalidLine,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Parsed values are unusable together
    InvalidConfig,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Motor,
    Settings,
    Buttons,
    Light,
    Temperature,
}

impl Section {
    fn from_name(name: &str) -> Result<Self, ParseError> {
        match name {
            "motor" => Ok(Section::Motor),
            "settings" => Ok(Section::Settings),
            "buttons" => Ok(Section::Buttons),
            "light" => Ok(Section::Light),
            "temperature" => Ok(Section::Temperature),
            _ => Err(ParseError::InvalidSection),
        }
    }
}

/// Parse TOML configuration into [`FirmwareConfig`]
pub fn parse_config(input: &str) -> Result<FirmwareConfig, ParseError> {
    let mut config = FirmwareConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(ParseError::InvalidSection)?
                .trim();
            section = Section::from_name(name)?;
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ParseError::InvalidLine)?;
        apply(&mut config, section, key.trim(), value.trim())?;
    }

    if !config.curtain.is_valid() {
        return Err(ParseError::InvalidConfig);
    }
    Ok(config)
}

fn apply(
    config: &mut FirmwareConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    let curtain = &mut config.curtain;
    match (section, key) {
        (Section::Motor, "total_steps") => curtain.total_steps = parse_int(value)?,
        (Section::Motor, "open_clockwise") => config.open_clockwise = parse_bool(value)?,
        (Section::Motor, "homing_travel_steps") => curtain.homing_travel_steps = parse_int(value)?,
        (Section::Settings, "write_delay_ms") => curtain.write_delay_ms = parse_int(value)?,
        (Section::Settings, "default_away") => curtain.default_away = parse_int(value)?,
        (Section::Buttons, "debounce_ms") => curtain.button_debounce_ms = parse_int(value)?,
        (Section::Light, "dark_threshold") => curtain.light.dark_threshold = parse_int(value)?,
        (Section::Light, "dusk_gap") => curtain.light.dusk_gap = parse_int(value)?,
        (Section::Light, "noise_gap") => curtain.light.noise_gap = parse_int(value)?,
        (Section::Light, "phase_delay_ms") => curtain.light.phase_delay_ms = parse_int(value)?,
        (Section::Temperature, "hot_threshold_c") => curtain.hot_threshold_c = parse_int(value)?,
        (Section::Temperature, "pullup_ohms") => config.ntc_pullup_ohms = parse_int(value)?,
        _ => {}
    }
    Ok(())
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    }
}

/// Parse an integer, allowing `_` separators
fn parse_int<T: FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: heapless::String<24> = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

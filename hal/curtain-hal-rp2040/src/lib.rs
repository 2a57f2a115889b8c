//! RP2040-specific HAL for the curtain controller firmware
//!
//! The RP2040 has no EEPROM, so this crate provides an emulated one:
//! a RAM shadow of the settings region implementing
//! [`curtain_hal::ByteStorage`], plus the flash backing that persists
//! images taken from it.

#![no_std]

pub mod flash;

pub use flash::{emulated_eeprom, EepromFlash, EepromImage, EmulatedEeprom};

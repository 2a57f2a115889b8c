//! Configuration types
//!
//! Board-agnostic tuning constants. These are compiled in (or parsed from
//! the firmware's embedded TOML) and are distinct from the user settings
//! persisted to storage.

pub mod hardware;

pub use hardware::*;

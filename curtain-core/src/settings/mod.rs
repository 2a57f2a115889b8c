//! Persisted user settings
//!
//! The in-memory [`Settings`] mirror, the fixed address table that maps
//! each field into the reserved storage region, and the [`SettingsStore`]
//! that coalesces edits into a single delayed write.

pub mod layout;
pub mod store;
pub mod types;

pub use layout::{Field, FieldSlot, FIELDS, MARKER, REGION_BASE, REGION_LEN};
pub use store::SettingsStore;
pub use types::{RemoteAction, Settings, MAX_AWAY};

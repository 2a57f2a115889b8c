//! Storage layout for persisted settings
//!
//! Every field has a fixed offset inside a reserved region near the end of
//! a 256-byte EEPROM:
//!
//! ```text
//! base = 0xE0
//! ┌────────┬──────────────────┬───────┐
//! │ Offset │ Field            │ Bytes │
//! ├────────┼──────────────────┼───────┤
//! │   0    │ marker (0xA5)    │   1   │
//! │   1    │ away (u32 LE)    │   4   │
//! │   5    │ autodawn         │   1   │
//! │   6    │ autotemp         │   1   │
//! │   7    │ remote_open      │   4   │
//! │  11    │ remote_close     │   4   │
//! │  15    │ remote_cancel    │   4   │
//! │  19    │ remote_autodawn  │   4   │
//! │  23    │ remote_autotemp  │   4   │
//! │ 27..32 │ reserved         │   5   │
//! └────────┴──────────────────┴───────┘
//! ```
//!
//! Adding a field means extending [`FIELDS`], [`encode`] and [`decode`]
//! together. The table is checked for overlap by the tests below.

use super::types::{RemoteAction, Settings, MAX_AWAY};

/// First address of the reserved settings region
pub const REGION_BASE: u16 = 0xE0;

/// Length of the reserved settings region in bytes
pub const REGION_LEN: usize = 32;

/// Offset of the validity marker inside the region
pub const MARKER_OFFSET: u16 = 0;

/// Marker value written after a complete flush
pub const MARKER: u8 = 0xA5;

/// Widest field encoding
pub const MAX_FIELD_WIDTH: usize = 4;

/// Persisted settings fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// [`Settings::away`]
    Away,
    /// [`Settings::autodawn`]
    Autodawn,
    /// [`Settings::autotemp`]
    Autotemp,
    /// One of the remote code fields
    Remote(RemoteAction),
}

/// Position of a field inside the region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldSlot {
    /// Field stored in this slot
    pub field: Field,
    /// Offset from [`REGION_BASE`]
    pub offset: u16,
    /// Encoded width in bytes
    pub width: usize,
}

impl FieldSlot {
    const fn new(field: Field, offset: u16, width: usize) -> Self {
        Self {
            field,
            offset,
            width,
        }
    }

    /// Absolute storage address of this slot
    pub fn address(&self) -> u16 {
        REGION_BASE + self.offset
    }
}

/// Address table, in write order
pub const FIELDS: [FieldSlot; 8] = [
    FieldSlot::new(Field::Away, 1, 4),
    FieldSlot::new(Field::Autodawn, 5, 1),
    FieldSlot::new(Field::Autotemp, 6, 1),
    FieldSlot::new(Field::Remote(RemoteAction::Open), 7, 4),
    FieldSlot::new(Field::Remote(RemoteAction::Close), 11, 4),
    FieldSlot::new(Field::Remote(RemoteAction::Cancel), 15, 4),
    FieldSlot::new(Field::Remote(RemoteAction::Autodawn), 19, 4),
    FieldSlot::new(Field::Remote(RemoteAction::Autotemp), 23, 4),
];

/// Absolute address of the validity marker
pub fn marker_address() -> u16 {
    REGION_BASE + MARKER_OFFSET
}

/// Encode one field into `buf`, returning the used prefix
pub fn encode<'a>(
    settings: &Settings,
    slot: &FieldSlot,
    buf: &'a mut [u8; MAX_FIELD_WIDTH],
) -> &'a [u8] {
    match slot.field {
        Field::Away => buf.copy_from_slice(&settings.away.to_le_bytes()),
        Field::Autodawn => buf[0] = settings.autodawn as u8,
        Field::Autotemp => buf[0] = settings.autotemp as u8,
        Field::Remote(action) => buf.copy_from_slice(&settings.remote_code(action).to_le_bytes()),
    }
    &buf[..slot.width]
}

/// Decode one field from `bytes` (exactly `slot.width` long) into `settings`
pub fn decode(settings: &mut Settings, slot: &FieldSlot, bytes: &[u8]) {
    match slot.field {
        Field::Away => settings.away = read_u32(bytes).min(MAX_AWAY),
        Field::Autodawn => settings.autodawn = bytes[0] != 0,
        Field::Autotemp => settings.autotemp = bytes[0] != 0,
        Field::Remote(action) => settings.set_remote_code(action, read_u32(bytes) as i32),
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(raw)
}

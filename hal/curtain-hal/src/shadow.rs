//! RAM-shadowed storage window
//!
//! Chips without an EEPROM keep the settings region in RAM so the control
//! loop can read and write it synchronously. Writes only mark the shadow
//! dirty; the owner takes a copy with [`ShadowStorage::take_image`] and
//! persists it elsewhere, typically from another task.

use crate::storage::{ByteStorage, StorageError};

/// `N` bytes of a `capacity`-byte device, starting at `base`
#[derive(Debug, Clone)]
pub struct ShadowStorage<const N: usize> {
    base: u16,
    capacity: usize,
    bytes: [u8; N],
    dirty: bool,
}

impl<const N: usize> ShadowStorage<N> {
    /// Create an erased window
    pub const fn new(base: u16, capacity: usize) -> Self {
        Self {
            base,
            capacity,
            bytes: [0xFF; N],
            dirty: false,
        }
    }

    /// Create a window filled from a persisted image
    pub const fn from_image(base: u16, capacity: usize, image: [u8; N]) -> Self {
        Self {
            base,
            capacity,
            bytes: image,
            dirty: false,
        }
    }

    /// Check if the window has changes not yet taken
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Copy of the window if it changed since the last take
    pub fn take_image(&mut self) -> Option<[u8; N]> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.bytes)
    }

    /// Map an absolute address range onto the window
    fn window(&self, address: u16, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        self.check_range(address, len)?;
        let start = (address as usize)
            .checked_sub(self.base as usize)
            .ok_or(StorageError::OutOfRange)?;
        if start + len > N {
            return Err(StorageError::OutOfRange);
        }
        Ok(start..start + len)
    }
}

impl<const N: usize> ByteStorage for ShadowStorage<N> {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&mut self, address: u16, buffer: &mut [u8]) -> Result<(), StorageError> {
        let range = self.window(address, buffer.len())?;
        buffer.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn write(&mut self, address: u16, data: &[u8]) -> Result<(), StorageError> {
        let range = self.window(address, data.len())?;
        if self.bytes[range.clone()] != *data {
            self.bytes[range].copy_from_slice(data);
            self.dirty = true;
        }
        Ok(())
    }
}

//! Byte-addressable storage abstractions
//!
//! Models a small EEPROM: every byte has a fixed address, reads and writes
//! go straight to that address, and there are no transactions. Chip HALs
//! without a real EEPROM emulate one (see `curtain-hal-rp2040`).

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Address range extends past the end of the device
    OutOfRange,
    /// Underlying device reported a failure
    Device,
}

/// Byte-addressable non-volatile storage
///
/// Implementations are expected to be synchronous and cheap enough to call
/// from the control loop. Writes are not required to be atomic across
/// multiple calls.
pub trait ByteStorage {
    /// Total number of addressable bytes
    fn capacity(&self) -> usize;

    /// Read `buffer.len()` bytes starting at `address`
    fn read(&mut self, address: u16, buffer: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` starting at `address`
    fn write(&mut self, address: u16, data: &[u8]) -> Result<(), StorageError>;

    /// Check that `len` bytes starting at `address` fit the device
    fn check_range(&self, address: u16, len: usize) -> Result<(), StorageError> {
        if address as usize + len > self.capacity() {
            Err(StorageError::OutOfRange)
        } else {
            Ok(())
        }
    }
}

impl<T: ByteStorage + ?Sized> ByteStorage for &mut T {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read(&mut self, address: u16, buffer: &mut [u8]) -> Result<(), StorageError> {
        (**self).read(address, buffer)
    }

    fn write(&mut self, address: u16, data: &[u8]) -> Result<(), StorageError> {
        (**self).write(address, data)
    }
}

/// In-memory storage for host-side testing
///
/// Starts filled with `0xFF` (the erased state of a fresh EEPROM) and counts
/// write calls so tests can assert on write wear.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone)]
pub struct MemoryStorage<const N: usize> {
    bytes: [u8; N],
    writes: usize,
    fail_writes: bool,
    /// Writes allowed before the device starts failing
    write_budget: Option<usize>,
    last_write: Option<u16>,
}

#[cfg(any(test, feature = "mock"))]
impl<const N: usize> Default for MemoryStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "mock"))]
impl<const N: usize> MemoryStorage<N> {
    /// Create erased storage
    pub const fn new() -> Self {
        Self {
            bytes: [0xFF; N],
            writes: 0,
            fail_writes: false,
            write_budget: None,
            last_write: None,
        }
    }

    /// Raw contents (for test verification)
    pub fn contents(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Number of `write` calls that reached the device
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Make every subsequent write fail with [`StorageError::Device`]
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Let `count` more writes succeed, then fail the rest (a torn write)
    pub fn fail_after(&mut self, count: usize) {
        self.write_budget = Some(self.writes + count);
    }

    /// Start address of the most recent successful write
    pub fn last_write_address(&self) -> Option<u16> {
        self.last_write
    }
}

#[cfg(any(test, feature = "mock"))]
impl<const N: usize> ByteStorage for MemoryStorage<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, address: u16, buffer: &mut [u8]) -> Result<(), StorageError> {
        self.check_range(address, buffer.len())?;
        let start = address as usize;
        buffer.copy_from_slice(&self.bytes[start..start + buffer.len()]);
        Ok(())
    }

    fn write(&mut self, address: u16, data: &[u8]) -> Result<(), StorageError> {
        self.check_range(address, data.len())?;
        if self.fail_writes || self.write_budget.is_some_and(|budget| self.writes >= budget) {
            return Err(StorageError::Device);
        }
        let start = address as usize;
        self.bytes[start..start + data.len()].copy_from_slice(data);
        self.writes += 1;
        self.last_write = Some(address);
        Ok(())
    }
}

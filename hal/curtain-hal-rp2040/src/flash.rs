//! Emulated EEPROM for RP2040
//!
//! The settings region lives in a RAM shadow ([`EmulatedEeprom`]) so the
//! control loop can read and write it synchronously. Images taken from the
//! shadow are persisted by [`EepromFlash`] as one item of a
//! sequential-storage map in the last 64KB of flash, from a task of their
//! own.

use curtain_core::settings::{REGION_BASE, REGION_LEN};
use curtain_hal::{FlashError, ShadowStorage, StorageKey};
use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on the Pico
pub const CONFIG_PARTITION_SIZE: usize = 64 * 1024;
pub const CONFIG_PARTITION_START: usize = FLASH_SIZE - CONFIG_PARTITION_SIZE;

/// Flash range for the config partition
pub const CONFIG_RANGE: core::ops::Range<u32> =
    (CONFIG_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Address space of the emulated device
pub const EEPROM_SIZE: usize = 256;

/// Scratch buffer for sequential-storage (key + item + overhead)
const DATA_BUFFER_SIZE: usize = 128;

/// Contents of the settings region
pub type EepromImage = [u8; REGION_LEN];

/// RAM shadow of the settings region
pub type EmulatedEeprom = ShadowStorage<REGION_LEN>;

/// Shadow filled from a persisted image, or erased when there is none
pub fn emulated_eeprom(image: Option<EepromImage>) -> EmulatedEeprom {
    match image {
        Some(image) => ShadowStorage::from_image(REGION_BASE, EEPROM_SIZE, image),
        None => ShadowStorage::new(REGION_BASE, EEPROM_SIZE),
    }
}

/// Flash backing for the emulated EEPROM
pub struct EepromFlash<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> EepromFlash<'d> {
    /// Take the flash peripheral
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// Read the last committed image
    ///
    /// Returns `Ok(None)` if nothing has been committed yet.
    pub async fn load(&mut self) -> Result<Option<EepromImage>, FlashError> {
        let mut data_buffer = [0u8; DATA_BUFFER_SIZE];

        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &StorageKey::EepromImage,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let image: EepromImage = data.try_into().map_err(|_| FlashError::Corrupted)?;
                Ok(Some(image))
            }
            Ok(None) => Ok(None),
            Err(_) => Err(FlashError::Storage),
        }
    }

    /// Persist an image taken from the shadow
    pub async fn store(&mut self, image: &EepromImage) -> Result<(), FlashError> {
        let mut data_buffer = [0u8; DATA_BUFFER_SIZE];
        let item: &[u8] = image;

        map::store_item(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &StorageKey::EepromImage,
            &item,
        )
        .await
        .map_err(|_| FlashError::Storage)
    }
}

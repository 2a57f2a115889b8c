//! Inter-task communication signals
//!
//! The sensor task publishes its latest readings; the curtain task takes
//! them on its next tick. A reading that is not taken before the next one
//! arrives is simply replaced. Settings images flow the other way, from the
//! curtain task to the storage task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use curtain_hal_rp2040::EepromImage;

/// Light sensor reading, scaled to 10 bits (updated by sensor task)
pub static LIGHT_READING: Signal<CriticalSectionRawMutex, u16> = Signal::new();

/// Temperature reading signal (updated by sensor task)
/// Value is whole degrees Celsius, or None for sensor fault
pub static TEMP_READING: Signal<CriticalSectionRawMutex, Option<i16>> = Signal::new();

/// Settings image to persist (updated by curtain task after a flush)
/// A newer image replaces one the storage task has not written yet
pub static SETTINGS_COMMIT: Signal<CriticalSectionRawMutex, EepromImage> = Signal::new();

//! Settings persistence task
//!
//! Waits for settings images from the curtain task and writes them to
//! flash, so the control loop never awaits a flash erase or program.

use defmt::*;

use curtain_hal_rp2040::EepromFlash;

use crate::channels::SETTINGS_COMMIT;

/// Settings persistence task
#[embassy_executor::task]
pub async fn storage_task(mut flash: EepromFlash<'static>) {
    info!("Storage task started");

    loop {
        let image = SETTINGS_COMMIT.wait().await;
        match flash.store(&image).await {
            Ok(()) => debug!("Settings committed to flash"),
            Err(e) => error!("Settings commit failed: {:?}", e),
        }
    }
}

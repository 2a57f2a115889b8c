//! Curtain - Motorized Curtain Controller Firmware
//!
//! Main firmware binary for an RP2040 (Raspberry Pi Pico) driving a
//! 28BYJ-48 stepper on a pulley, with a home limit switch, two front-panel
//! buttons, an LDR and an NTC thermistor.
//!
//! Pin assignment:
//!
//! | Function        | GPIO      |
//! |-----------------|-----------|
//! | Coils IN1..IN4  | 2, 3, 4, 5|
//! | Open button     | 6         |
//! | Close button    | 7         |
//! | Home switch     | 8         |
//! | LDR divider     | 26 (ADC0) |
//! | NTC divider     | 27 (ADC1) |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use {defmt_rtt as _, panic_probe as _};

use curtain_core::app::CurtainApp;
use curtain_drivers::stepper::UnipolarStepper;
use curtain_hal_rp2040::{emulated_eeprom, EepromFlash};

mod channels;
mod config;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit curtain.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../curtain.toml");

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Curtain firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load(EMBEDDED_CONFIG);
    info!("Configuration: {:?}", config);

    // Emulated EEPROM must be filled from flash before the settings load
    let mut flash = EepromFlash::new(p.FLASH, p.DMA_CH0);
    let image = match flash.load().await {
        Ok(Some(image)) => {
            info!("Settings image loaded from flash");
            Some(image)
        }
        Ok(None) => {
            info!("No settings image in flash");
            None
        }
        Err(e) => {
            warn!("Settings image unreadable: {:?}", e);
            None
        }
    };
    let eeprom = emulated_eeprom(image);

    let stepper = UnipolarStepper::new(
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        Output::new(p.PIN_4, Level::Low),
        Output::new(p.PIN_5, Level::Low),
        config.open_clockwise,
    );

    let buttons = tasks::Buttons {
        open: Input::new(p.PIN_6, Pull::Up),
        close: Input::new(p.PIN_7, Pull::Up),
        home: Input::new(p.PIN_8, Pull::Up),
    };

    let mut app = CurtainApp::new(stepper, eeprom, &config.curtain);

    // Holding both buttons through boot restores factory settings
    if buttons.open.is_low() && buttons.close.is_low() {
        warn!("Both buttons held at boot, resetting settings");
        factory_reset(&mut app, &mut flash).await;
    } else if app.load() {
        info!("Settings: {:?}", app.curtain().settings());
    } else {
        info!("No stored settings, using defaults");
    }

    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let light_channel = Channel::new_pin(p.PIN_26, Pull::None);
    let therm_channel = Channel::new_pin(p.PIN_27, Pull::None);
    let sensor_config = tasks::SensorConfig {
        pullup_ohms: config.ntc_pullup_ohms,
    };

    spawner.spawn(tasks::storage_task(flash)).unwrap();
    spawner.spawn(tasks::curtain_task(app, buttons)).unwrap();
    spawner
        .spawn(tasks::sensor_task(adc, light_channel, therm_channel, sensor_config))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Erase the settings region and persist the erased image immediately
async fn factory_reset(app: &mut tasks::App, flash: &mut EepromFlash<'static>) {
    let store = app.curtain_mut().store_mut();
    if let Err(e) = store.reset() {
        error!("Settings reset failed: {:?}", e);
        return;
    }
    let Some(image) = store.storage_mut().take_image() else {
        info!("Settings already at defaults");
        return;
    };
    match flash.store(&image).await {
        Ok(()) => info!("Settings reset to defaults"),
        Err(e) => error!("Settings reset commit failed: {:?}", e),
    }
}

//! Curtain control task
//!
//! Runs the application poll every millisecond. Each tick it samples the
//! buttons and the home switch, picks up any fresh sensor readings, polls
//! [`CurtainApp`], logs what happened and hands the emulated EEPROM image
//! to the storage task after a settings flush.

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_time::{Duration, Instant, Ticker};

use curtain_core::app::{AppReport, CurtainApp, InputSample};
use curtain_core::motion::MotionEvent;
use curtain_drivers::stepper::UnipolarStepper;
use curtain_hal_rp2040::EmulatedEeprom;

use crate::channels::{LIGHT_READING, SETTINGS_COMMIT, TEMP_READING};

/// Poll interval, which is also the half-step interval
const TICK_INTERVAL_MS: u64 = 1;

/// Stepper on four GPIO outputs
pub type Stepper =
    UnipolarStepper<Output<'static>, Output<'static>, Output<'static>, Output<'static>>;

/// The application as wired on this board
pub type App = CurtainApp<Stepper, EmulatedEeprom>;

/// Front-panel inputs (all active low with pull-ups)
pub struct Buttons {
    pub open: Input<'static>,
    pub close: Input<'static>,
    pub home: Input<'static>,
}

impl Buttons {
    fn sample(&self) -> InputSample {
        InputSample {
            open_button: self.open.is_low(),
            close_button: self.close.is_low(),
            home_switch: self.home.is_low(),
            // No IR receiver is fitted on this board
            remote_code: None,
            light: LIGHT_READING.try_take(),
            temperature_c: TEMP_READING.try_take().flatten(),
        }
    }
}

/// Curtain control task
#[embassy_executor::task]
pub async fn curtain_task(mut app: App, buttons: Buttons) {
    info!("Curtain task started");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));

    loop {
        // Wrapping millisecond clock; the core handles rollover
        let now = Instant::now().as_millis() as u32;
        let sample = buttons.sample();

        let report = app.poll(now, &sample);
        if !report.is_quiet() {
            log_report(&app, &report);
        }

        if report.poll.flushed == Ok(true) {
            match app.curtain_mut().store_mut().storage_mut().take_image() {
                Some(image) => SETTINGS_COMMIT.signal(image),
                None => trace!("Settings unchanged, no flash write"),
            }
        }

        ticker.next().await;
    }
}

fn log_report(app: &App, report: &AppReport) {
    for command in report.commands.iter() {
        info!("Command: {:?}", command);
    }

    if report.home_reached {
        info!("Home switch reached, position zeroed");
    }

    if let Some(action) = report.learned {
        info!("Learned remote code for {:?}", action);
        if app.learning().is_none() {
            info!("Remote learning complete");
        }
    }

    match report.poll.flushed {
        Ok(true) => debug!("Settings flushed: {:?}", app.curtain().settings()),
        Ok(false) => {}
        Err(e) => error!("Settings flush failed: {:?}", e),
    }

    match report.poll.motion {
        Some(MotionEvent::Started { direction, steps }) => {
            debug!("Moving {:?} by {} steps", direction, steps)
        }
        Some(MotionEvent::Completed { position }) => info!("Move complete at {}", position),
        Some(MotionEvent::HomingFailed) => {
            warn!("Home switch not found, position unknown until homed")
        }
        None => {}
    }
}

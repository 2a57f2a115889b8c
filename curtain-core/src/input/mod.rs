//! Input debouncing
//!
//! Turns raw samples (button levels, decoded remote codes, the home switch,
//! light and temperature readings) into debounced, edge-triggered state
//! that the command dispatcher consumes once per poll.

pub mod buttons;
pub mod light;
pub mod remote;

pub use buttons::{Button, ButtonDebouncer};
pub use light::{Brightness, LightClassifier};
pub use remote::RemoteLatch;

use crate::config::CurtainConfig;

/// One poll's worth of raw input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputSample {
    /// Open button level (true = pressed)
    pub open_button: bool,
    /// Close button level (true = pressed)
    pub close_button: bool,
    /// Home limit switch level (true = tripped), not debounced
    pub home_switch: bool,
    /// Remote code decoded since the previous sample
    pub remote_code: Option<i32>,
    /// Fresh light sensor reading
    pub light: Option<u16>,
    /// Fresh temperature reading in °C
    pub temperature_c: Option<i16>,
}

/// Debounced state of every input
#[derive(Debug, Clone)]
pub struct Inputs {
    /// Open/close front-panel buttons
    pub buttons: ButtonDebouncer,
    /// Latest remote code and its new-signal flag
    pub remote: RemoteLatch,
    /// Dawn/dusk classification of the light sensor
    pub light: LightClassifier,
    home_switch: bool,
    temperature_c: Option<i16>,
}

impl Inputs {
    /// Create input state from configuration
    pub fn new(config: &CurtainConfig) -> Self {
        Self {
            buttons: ButtonDebouncer::new(config.button_debounce_ms),
            remote: RemoteLatch::new(),
            light: LightClassifier::new(config.light),
            home_switch: false,
            temperature_c: None,
        }
    }

    /// Feed one sample
    pub fn update(&mut self, sample: &InputSample, now: u32) {
        self.buttons
            .update(sample.open_button, sample.close_button, now);

        if let Some(code) = sample.remote_code {
            self.remote.receive(code, now);
        }

        match sample.light {
            Some(reading) => self.light.update(reading, now),
            None => self.light.settle(now),
        }

        self.home_switch = sample.home_switch;
        if sample.temperature_c.is_some() {
            self.temperature_c = sample.temperature_c;
        }
    }

    /// Raw home switch level from the last sample
    pub fn home_pressed(&self) -> bool {
        self.home_switch
    }

    /// Latest temperature reading
    pub fn temperature(&self) -> Option<i16> {
        self.temperature_c
    }

    /// Milliseconds since the most recent button press or remote code
    pub fn time_since_input(&self, now: u32) -> Option<u32> {
        let since_press = self.buttons.last_press_time().map(|t| now.wrapping_sub(t));
        let since_signal = self.remote.last_signal_time().map(|t| now.wrapping_sub(t));
        match (since_press, since_signal) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

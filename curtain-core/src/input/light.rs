//! Day phase classification from the light sensor
//!
//! Readings are classified with hysteresis:
//!
//! ```text
//!   0 ─── dark_threshold ─── dark_threshold + dusk_gap ─── max
//!   │  DARK   │        DUSK (keep phase)       │   LIGHT   │
//! ```
//!
//! A reading that differs from the last considered reading by less than
//! `noise_gap` is ignored entirely. A phase change must be measured
//! continuously for `phase_delay_ms` before it is accepted.

use crate::config::LightConfig;
use crate::timer::PendingTimer;

/// Accepted day phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Brightness {
    /// Night
    Dark,
    /// Day
    Light,
}

/// Debounced light/dark classifier
#[derive(Debug, Clone)]
pub struct LightClassifier {
    config: LightConfig,
    last_reading: Option<u16>,
    phase: Brightness,
    /// Phase being measured but not yet accepted
    candidate: Option<Brightness>,
    candidate_timer: PendingTimer,
    transition: Option<Brightness>,
    last_transition_at: Option<u32>,
}

impl LightClassifier {
    /// Create a classifier that assumes daylight until told otherwise
    pub fn new(config: LightConfig) -> Self {
        Self {
            config,
            last_reading: None,
            phase: Brightness::Light,
            candidate: None,
            candidate_timer: PendingTimer::new(),
            transition: None,
            last_transition_at: None,
        }
    }

    /// Classify a single reading, `None` inside the dusk band
    pub fn classify(&self, reading: u16) -> Option<Brightness> {
        if reading < self.config.dark_threshold {
            Some(Brightness::Dark)
        } else if reading > self.config.light_threshold() {
            Some(Brightness::Light)
        } else {
            None
        }
    }

    /// Feed a reading taken at `now`
    pub fn update(&mut self, reading: u16, now: u32) {
        let considered = match self.last_reading {
            Some(last) => reading.abs_diff(last) >= self.config.noise_gap,
            None => true,
        };

        if considered {
            self.last_reading = Some(reading);
            match self.classify(reading) {
                Some(measured) if measured != self.phase => {
                    if self.candidate != Some(measured) {
                        self.candidate = Some(measured);
                        self.candidate_timer.arm(now);
                    }
                }
                Some(_) => {
                    self.candidate = None;
                    self.candidate_timer.disarm();
                }
                None => {}
            }
        }

        self.settle(now);
    }

    /// Accept the candidate phase once it has held long enough
    ///
    /// Also called on ticks without a fresh reading, so a steady sensor
    /// still completes the phase delay.
    pub fn settle(&mut self, now: u32) {
        let Some(candidate) = self.candidate else {
            return;
        };
        if self.candidate_timer.is_due(now, self.config.phase_delay_ms) {
            self.phase = candidate;
            self.candidate = None;
            self.candidate_timer.disarm();
            self.transition = Some(candidate);
            self.last_transition_at = Some(now);
        }
    }

    /// Current accepted phase
    pub fn phase(&self) -> Brightness {
        self.phase
    }

    /// Check if the accepted phase is dark
    pub fn is_dark(&self) -> bool {
        self.phase == Brightness::Dark
    }

    /// Last reading that passed the noise filter
    pub fn last_reading(&self) -> Option<u16> {
        self.last_reading
    }

    /// When the last phase change was accepted
    pub fn last_transition_time(&self) -> Option<u32> {
        self.last_transition_at
    }

    /// Take an accepted phase change, reporting each change once
    pub fn take_transition(&mut self) -> Option<Brightness> {
        self.transition.take()
    }
}

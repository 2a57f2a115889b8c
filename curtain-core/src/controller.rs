//! Curtain poll loop
//!
//! [`Curtain`] pairs the settings store with the position controller and
//! exposes the single `poll` entry point the host calls every cycle. Within
//! one poll the deferred settings write is evaluated before motion advances.

use curtain_hal::{ByteStorage, StorageError};

use crate::config::CurtainConfig;
use crate::motion::{Direction, MotionEvent, PositionController};
use crate::settings::{Settings, SettingsStore};
use crate::traits::MotionDriver;

/// What happened during one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollReport {
    /// `Ok(true)` if settings were written to storage this poll
    pub flushed: Result<bool, StorageError>,
    /// Motion event, if any
    pub motion: Option<MotionEvent>,
}

impl PollReport {
    /// Check if nothing worth logging happened
    pub fn is_quiet(&self) -> bool {
        matches!(self.flushed, Ok(false)) && self.motion.is_none()
    }
}

/// Position controller and settings store driven by one poll loop
pub struct Curtain<M, S> {
    store: SettingsStore<S>,
    position: PositionController<M>,
}

impl<M: MotionDriver, S: ByteStorage> Curtain<M, S> {
    /// Create a curtain with default settings and unknown position
    pub fn new(driver: M, storage: S, config: &CurtainConfig) -> Self {
        Self {
            store: SettingsStore::new(
                storage,
                Settings::with_away(config.default_away),
                config.write_delay_ms,
            ),
            position: PositionController::new(driver, config),
        }
    }

    /// Load persisted settings (call once at startup)
    pub fn load(&mut self) -> bool {
        self.store.load()
    }

    /// Run one cycle: deferred settings write, then one motion tick
    pub fn poll(&mut self, now: u32) -> PollReport {
        let flushed = self.store.flush_if_due(now);
        let motion = self.position.tick();
        PollReport { flushed, motion }
    }

    /// Current settings
    pub fn settings(&self) -> &Settings {
        self.store.settings()
    }

    /// Settings store
    pub fn store(&self) -> &SettingsStore<S> {
        &self.store
    }

    /// Mutable settings store
    pub fn store_mut(&mut self) -> &mut SettingsStore<S> {
        &mut self.store
    }

    /// Position controller
    pub fn position(&self) -> &PositionController<M> {
        &self.position
    }

    /// Current position in steps
    pub fn location(&self) -> i32 {
        self.position.location()
    }

    /// Check if a move is in progress
    pub fn is_moving(&self) -> bool {
        self.position.is_moving()
    }

    /// Check if the position is known
    pub fn is_homed(&self) -> bool {
        self.position.is_homed()
    }

    /// Check if a homing run is in progress
    pub fn is_homing(&self) -> bool {
        self.position.is_homing()
    }

    /// Request the fully open position
    pub fn open(&mut self) -> bool {
        self.position.open()
    }

    /// Request the fully closed position at the stored away distance
    pub fn close(&mut self) -> bool {
        let away = self.store.settings().away;
        self.position.close(away)
    }

    /// Request a quarter-turn nudge
    pub fn step(&mut self, direction: Direction) -> bool {
        let away = self.store.settings().away;
        self.position.step(direction, away)
    }

    /// Request an absolute target
    pub fn set_target(&mut self, target: i32) -> bool {
        self.position.set_target(target)
    }

    /// Stop the current move
    pub fn cancel(&mut self) -> bool {
        self.position.cancel()
    }

    /// Declare the current position home
    pub fn set_home(&mut self) {
        self.position.set_home();
    }

    /// Start a homing run
    pub fn seek_home(&mut self) -> bool {
        self.position.seek_home()
    }

    /// Store a new away distance
    ///
    /// Only the setting changes; a curtain already closed further than the
    /// new distance stays where it is.
    pub fn set_away(&mut self, away: u32, now: u32) -> bool {
        self.store.set_away(away, now)
    }

    /// Store the current position as the away distance
    pub fn set_away_here(&mut self, now: u32) -> bool {
        if !self.position.is_homed() || self.position.is_moving() {
            return false;
        }
        let here = self.position.location().max(0) as u32;
        self.store.set_away(here, now)
    }
}

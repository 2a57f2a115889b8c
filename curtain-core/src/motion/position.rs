//! Position controller
//!
//! Tracks the absolute step position of the curtain and turns target
//! changes into moves on a [`MotionDriver`]. Position is only committed when
//! a move finishes (or is cancelled), so the driver's remaining-step count
//! is the single source of truth while the motor is running.

use crate::config::CurtainConfig;
use crate::traits::{Direction, MotionDriver};

/// Position sentinel before the home switch has been seen
pub const UNKNOWN_POSITION: i32 = -1;

/// Something the controller did during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionEvent {
    /// A new move was issued to the driver
    Started {
        /// Travel direction
        direction: Direction,
        /// Planned step count
        steps: u32,
    },
    /// The driver finished and the target was reached
    Completed {
        /// Position after the move
        position: i32,
    },
    /// A homing run used up its travel without the home switch tripping
    HomingFailed,
}

/// Absolute position state machine over a motion driver
pub struct PositionController<M> {
    driver: M,
    /// Committed position in steps
    position: i32,
    /// Requested position in steps
    target: i32,
    /// Position when the current move was issued
    move_origin: i32,
    in_motion: bool,
    /// Blind run toward the home switch in progress
    homing: bool,
    quarter_turn: i32,
    homing_travel: i32,
}

impl<M: MotionDriver> PositionController<M> {
    /// Create a controller with unknown position
    pub fn new(driver: M, config: &CurtainConfig) -> Self {
        Self {
            driver,
            position: UNKNOWN_POSITION,
            target: UNKNOWN_POSITION,
            move_origin: UNKNOWN_POSITION,
            in_motion: false,
            homing: false,
            quarter_turn: config.quarter_turn().min(i32::MAX as u32) as i32,
            homing_travel: config.homing_travel_steps.min(i32::MAX as u32) as i32,
        }
    }

    /// Current committed position
    pub fn location(&self) -> i32 {
        self.position
    }

    /// Current target
    pub fn target(&self) -> i32 {
        self.target
    }

    /// Check if a move is in progress
    pub fn is_moving(&self) -> bool {
        self.in_motion
    }

    /// Check if the position is known
    pub fn is_homed(&self) -> bool {
        !self.homing && self.position != UNKNOWN_POSITION
    }

    /// Check if a homing run is in progress
    pub fn is_homing(&self) -> bool {
        self.homing
    }

    /// Direction of the move in progress
    pub fn moving_direction(&self) -> Option<Direction> {
        if !self.in_motion {
            return None;
        }
        Some(if self.target < self.move_origin {
            Direction::Open
        } else {
            Direction::Close
        })
    }

    /// Get the underlying driver
    pub fn driver(&self) -> &M {
        &self.driver
    }

    /// Get mutable access to the underlying driver
    pub fn driver_mut(&mut self) -> &mut M {
        &mut self.driver
    }

    /// Declare the current physical position to be home
    ///
    /// Halts the driver and forces position and target to 0. Callers must
    /// only use this once the motor is known to be at the home switch.
    pub fn set_home(&mut self) {
        self.driver.halt();
        self.position = 0;
        self.target = 0;
        self.move_origin = 0;
        self.in_motion = false;
        self.homing = false;
    }

    /// Request a new target
    ///
    /// Rejected while moving or until homing has succeeded, and a no-op if
    /// `value` is already the target. Returns `true` if the target changed.
    pub fn set_target(&mut self, value: i32) -> bool {
        if self.in_motion || !self.is_homed() || value == self.target {
            return false;
        }
        self.target = value;
        true
    }

    /// Request the fully open (home) position
    pub fn open(&mut self) -> bool {
        self.set_target(0)
    }

    /// Request the fully closed position
    ///
    /// Rejected when `away` is 0, which means closing travel is unbounded.
    pub fn close(&mut self, away: u32) -> bool {
        if away == 0 {
            return false;
        }
        self.set_target(away.min(i32::MAX as u32) as i32)
    }

    /// Request a quarter-turn nudge from the current position
    ///
    /// Clamped to `[0, away]`, or to `[0, i32::MAX]` when `away` is 0.
    pub fn step(&mut self, direction: Direction, away: u32) -> bool {
        if self.in_motion || !self.is_homed() {
            return false;
        }

        let upper = if away == 0 {
            i32::MAX
        } else {
            away.min(i32::MAX as u32) as i32
        };
        let wanted = match direction {
            Direction::Open => self.position.saturating_sub(self.quarter_turn),
            Direction::Close => self.position.saturating_add(self.quarter_turn),
        };
        self.set_target(wanted.clamp(0, upper))
    }

    /// Start a blind run toward the home switch
    ///
    /// Treats the current position as a provisional origin and targets the
    /// full homing travel in the opening direction. The run ends when the
    /// caller reports the switch with [`set_home`](Self::set_home).
    pub fn seek_home(&mut self) -> bool {
        if self.in_motion {
            return false;
        }
        self.homing = true;
        self.position = 0;
        self.target = -self.homing_travel;
        true
    }

    /// Stop the current move and commit the position actually reached
    ///
    /// Returns `false` if nothing was moving.
    pub fn cancel(&mut self) -> bool {
        if !self.in_motion {
            self.driver.halt();
            return false;
        }

        let remaining = self.driver.steps_remaining() as i64;
        self.driver.halt();
        self.in_motion = false;

        if self.homing {
            // The provisional origin says nothing about where home is
            self.homing = false;
            self.position = UNKNOWN_POSITION;
            self.target = UNKNOWN_POSITION;
            return true;
        }

        let origin = self.move_origin as i64;
        let planned = (self.target as i64 - origin).abs();
        let traveled = (planned - remaining).max(0);
        let recovered = if (self.target as i64) < origin {
            origin - traveled
        } else {
            origin + traveled
        };

        self.position = recovered as i32;
        self.target = self.position;
        true
    }

    /// Advance motion by one poll tick
    ///
    /// Issuing a move and detecting completion never happen in the same
    /// tick, and a freshly issued move first advances on the next tick.
    pub fn tick(&mut self) -> Option<MotionEvent> {
        let mut event = None;

        if self.target != self.position && !self.in_motion {
            let delta = self.target as i64 - self.position as i64;
            let direction = if delta > 0 {
                Direction::Close
            } else {
                Direction::Open
            };
            let steps = u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX);

            self.driver.begin_move(direction, steps);
            self.move_origin = self.position;
            self.in_motion = true;
            event = Some(MotionEvent::Started { direction, steps });
        } else if self.driver.is_busy() {
            self.driver.advance();
        } else {
            self.position = self.target;
        }

        if self.position == self.target && self.in_motion {
            self.driver.halt();
            self.in_motion = false;
            event = Some(self.finish());
        }

        event
    }

    /// Settle bookkeeping once a move reached its target
    fn finish(&mut self) -> MotionEvent {
        if self.homing {
            self.homing = false;
            self.position = UNKNOWN_POSITION;
            self.target = UNKNOWN_POSITION;
            return MotionEvent::HomingFailed;
        }
        MotionEvent::Completed {
            position: self.position,
        }
    }
}

//! Pending-timestamp debounce primitive
//!
//! One instance per debounced concern: the settings writer, the button
//! debouncer, and the light phase classifier all reduce to "remember when
//! something happened, act once it has been quiet for long enough".
//!
//! Timestamps are milliseconds from a free-running `u32` clock. Elapsed time
//! uses wrapping arithmetic, so a timer armed just before rollover still
//! fires on schedule.

/// A single optional deadline anchor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingTimer {
    armed_at: Option<u32>,
}

impl PendingTimer {
    /// Create a disarmed timer
    pub const fn new() -> Self {
        Self { armed_at: None }
    }

    /// Arm (or re-arm) the timer at `now`
    ///
    /// Re-arming an armed timer moves the anchor forward rather than
    /// stacking a second deadline.
    pub fn arm(&mut self, now: u32) {
        self.armed_at = Some(now);
    }

    /// Disarm the timer
    pub fn disarm(&mut self) {
        self.armed_at = None;
    }

    /// Check if the timer is armed
    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Timestamp the timer was last armed at
    pub fn armed_at(&self) -> Option<u32> {
        self.armed_at
    }

    /// Milliseconds since the timer was armed, if armed
    pub fn elapsed(&self, now: u32) -> Option<u32> {
        self.armed_at.map(|at| now.wrapping_sub(at))
    }

    /// Check if the timer is armed and at least `delay_ms` has passed
    pub fn is_due(&self, now: u32, delay_ms: u32) -> bool {
        matches!(self.elapsed(now), Some(elapsed) if elapsed >= delay_ms)
    }
}

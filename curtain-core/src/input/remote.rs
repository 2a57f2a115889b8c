//! Remote code latch

/// Holds the most recent remote code until it is consumed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RemoteLatch {
    latest: i32,
    fresh: bool,
    last_at: Option<u32>,
}

impl RemoteLatch {
    /// Create an empty latch
    pub const fn new() -> Self {
        Self {
            latest: 0,
            fresh: false,
            last_at: None,
        }
    }

    /// Record a decoded code
    pub fn receive(&mut self, code: i32, now: u32) {
        self.latest = code;
        self.fresh = true;
        self.last_at = Some(now);
    }

    /// Check if a code arrived since the last [`take_signal`](Self::take_signal)
    pub fn new_signal(&self) -> bool {
        self.fresh
    }

    /// Consume the pending code
    pub fn take_signal(&mut self) -> Option<i32> {
        if core::mem::take(&mut self.fresh) {
            Some(self.latest)
        } else {
            None
        }
    }

    /// Most recent code, consumed or not
    pub fn latest(&self) -> i32 {
        self.latest
    }

    /// When the most recent code arrived
    pub fn last_signal_time(&self) -> Option<u32> {
        self.last_at
    }
}

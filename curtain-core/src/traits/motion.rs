//! Motion driver trait
//!
//! Abstracts the physical step generator. The position controller only
//! ever asks for a direction and a step count, then polls for progress.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Curtain travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Toward home (position decreasing)
    Open,
    /// Toward away (position increasing)
    Close,
}

impl Direction {
    /// Sign of a position change in this direction
    pub fn sign(self) -> i32 {
        match self {
            Direction::Open => -1,
            Direction::Close => 1,
        }
    }
}

/// Trait for step generators
///
/// A move is issued once with [`begin_move`](MotionDriver::begin_move) and
/// then advanced by repeated calls to [`advance`](MotionDriver::advance),
/// each of which performs at most one step. Implementations are assumed
/// never to fail a commanded move.
pub trait MotionDriver {
    /// Start a new move of `steps` steps in `direction`
    ///
    /// Replaces any move already in progress.
    fn begin_move(&mut self, direction: Direction, steps: u32);

    /// Perform one unit of work toward the current move
    ///
    /// Returns the number of steps still remaining afterwards.
    fn advance(&mut self) -> u32;

    /// Steps remaining in the current move (0 when idle)
    fn steps_remaining(&self) -> u32;

    /// Stop immediately and discard the remainder of the move
    fn halt(&mut self);

    /// Check if a move is still outstanding
    fn is_busy(&self) -> bool {
        self.steps_remaining() != 0
    }
}

//! Curtain motion
//!
//! Position bookkeeping on top of a [`MotionDriver`](crate::traits::MotionDriver).

pub mod position;

pub use crate::traits::Direction;
pub use position::{MotionEvent, PositionController, UNKNOWN_POSITION};

//! Hardware abstraction traits
//!
//! These traits define the interface between the curtain logic and
//! hardware-specific implementations.

pub mod motion;
pub mod sensor;

pub use motion::{Direction, MotionDriver};
pub use sensor::{SensorError, TemperatureSensor};

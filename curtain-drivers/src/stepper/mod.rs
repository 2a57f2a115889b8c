//! Stepper driver implementations

pub mod unipolar;

pub use unipolar::{UnipolarStepper, HALF_STEP_SEQUENCE};

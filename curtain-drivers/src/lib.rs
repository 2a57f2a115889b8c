//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in curtain-core:
//!
//! - Stepper drivers (4-coil unipolar, e.g. 28BYJ-48 on a ULN2003 board)
//! - Temperature sensors (NTC thermistor)

#![no_std]
#![deny(unsafe_code)]

pub mod sensor;
pub mod stepper;

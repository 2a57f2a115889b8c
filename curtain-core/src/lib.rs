//! Board-agnostic core logic for the curtain controller firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (motion driver, temperature sensor)
//! - Pending-timer debounce primitive
//! - Persisted settings, their storage layout, and the debounced writer
//! - Position controller and the poll loop that drives it
//! - Input debouncing (buttons, remote, light sensor)
//! - Automation and command dispatch
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod app;
pub mod config;
pub mod controller;
pub mod input;
pub mod motion;
pub mod settings;
pub mod timer;
pub mod traits;

pub use app::{AppReport, Command, CurtainApp, InputSample};
pub use controller::{Curtain, PollReport};
pub use motion::{Direction, MotionEvent, PositionController, UNKNOWN_POSITION};
pub use settings::{RemoteAction, Settings, SettingsStore};
pub use timer::PendingTimer;

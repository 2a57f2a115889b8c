//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals.

pub mod curtain;
pub mod sensor;
pub mod storage;

pub use curtain::{curtain_task, App, Buttons, Stepper};
pub use sensor::{sensor_task, SensorConfig};
pub use storage::storage_task;

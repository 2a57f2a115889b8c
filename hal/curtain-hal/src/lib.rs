//! Curtain Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits that chip-specific
//! HALs implement, so the curtain state machines in `curtain-core` can run
//! unchanged on the RP2040 target and on the host under test.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  curtain-firmware / curtain-core        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  curtain-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ curtain-hal-  │       │ MemoryStorage │
//! │    rp2040     │       │ (mock, tests) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`storage::ByteStorage`] - Byte-addressable non-volatile storage
//! - [`flash::StorageKey`] - Keys for flash-backed persistence
//! - [`shadow::ShadowStorage`] - RAM window for chips that emulate an EEPROM

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod shadow;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, StorageKey};
pub use shadow::ShadowStorage;
pub use storage::{ByteStorage, StorageError};

#[cfg(any(test, feature = "mock"))]
pub use storage::MemoryStorage;

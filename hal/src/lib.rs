//! Hardware Abstraction Layer (HAL) for Cortex-M interrupt control and timing
//!
//! This crate provides vendor-agnostic traits for the processor's interrupt
//! controller, its fixed system exceptions and the system countdown timer.
//! Concrete register-level implementations live in vendor crates such as
//! `hal-cmsis`.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod error;
pub mod interrupt;
pub mod timer;

// Re-export commonly used types
pub use error::{HalError, HalResult};
pub use interrupt::{
    Exception, ExceptionControl, ExceptionController, InterruptController, InterruptPriority,
};
pub use timer::{Timer, TimerCallback};

#[cfg(test)]
extern crate std;

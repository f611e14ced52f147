//! RP2040-specific HAL for the weather display firmware
//!
//! Implements the shared `matrixweather-hal` traits on top of `embassy-rp`:
//!
//! - GPIO output for the indicator LED
//! - GPIO inputs for the brightness buttons
//! - System reset through the Cortex-M SCB

#![no_std]

pub mod gpio;
pub mod reset;

pub use gpio::{RpInput, RpOutput};
pub use reset::ScbReset;

// Re-export shared traits from matrixweather-hal for convenience
pub use matrixweather_hal::{InputPin, OutputPin, SystemReset};

//! Driver implementations
//!
//! Concrete implementations of the matrixweather-core traits on top of
//! the GPIO abstractions in matrixweather-hal:
//!
//! - Status indicator on a GPIO output (LED, active-high or active-low)
//! - Push-buttons on GPIO inputs

#![no_std]
#![deny(unsafe_code)]

pub mod button;
pub mod indicator;

pub use button::GpioButton;
pub use indicator::GpioIndicator;

//! MatrixWeather Hardware Abstraction Layer
//!
//! This crate defines the small set of hardware traits the weather display
//! needs from a board: digital pins for the indicator LED and the two
//! brightness buttons, and the irreversible system reset used by the
//! timed-reset recovery policy.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Application (matrixweather-firmware)       │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │  matrixweather-hal (this crate - traits)    │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼
//!             ┌──────────────────┐
//!             │ matrixweather-   │
//!             │   hal-rp2040     │
//!             └──────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`reset::SystemReset`] - Hardware reset

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod reset;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use reset::SystemReset;

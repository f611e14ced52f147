//! Board-agnostic core logic for the weather display firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (clock, indicator, buttons, data sources)
//! - Failover supervisor and its operational mode state machine
//! - Fetch scheduling (time sync and weather intervals)
//! - The primary loop: fetch, render, scroll and brightness input
//! - Configuration types and the settings document parser

#![no_std]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every other module
mod fmt;

pub mod app;
pub mod config;
pub mod device;
pub mod error;
pub mod scheduler;
pub mod supervisor;
pub mod traits;

pub use device::DeviceContext;
pub use error::{AppError, ConfigError, SupervisorError};

#[cfg(test)]
mod testing;

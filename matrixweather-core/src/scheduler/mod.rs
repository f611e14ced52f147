//! Fetch scheduling
//!
//! Gates the periodic time sync and weather fetch on a monotonic clock.

pub mod fetch;
pub mod interval;

pub use fetch::{FetchScheduler, FetchTarget};
pub use interval::IntervalGate;

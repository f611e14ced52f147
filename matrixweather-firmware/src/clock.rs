//! Monotonic clock on the embassy time driver

use embassy_time::Instant;
use matrixweather_core::traits::Clock;

/// Milliseconds since boot
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

//! Monotonic time source

/// Monotonic millisecond clock
///
/// Must never go backwards. The origin is arbitrary (usually boot).
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

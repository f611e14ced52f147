//! Device context
//!
//! All physical resources live here, constructed once at startup and
//! handed by `&mut` to whichever of the primary loop or the supervisor is
//! currently in charge. Nothing re-initialises them short of a hardware
//! reset.

/// Physical resources of the display
pub struct DeviceContext<D, I, B, C> {
    /// Matrix panel
    pub display: D,
    /// Status indicator
    pub indicator: I,
    /// Brightness up button
    pub up: B,
    /// Brightness down button
    pub down: B,
    /// Monotonic clock
    pub clock: C,
}

impl<D, I, B, C> DeviceContext<D, I, B, C> {
    pub fn new(display: D, indicator: I, up: B, down: B, clock: C) -> Self {
        Self {
            display,
            indicator,
            up,
            down,
            clock,
        }
    }
}

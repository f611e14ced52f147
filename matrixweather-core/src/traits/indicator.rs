//! Status indicator output

/// Trait for the status indicator
///
/// A single visible output (LED or status pixel). The primary loop lights
/// it while a fetch is in flight; the supervisor blinks it once degraded.
pub trait Indicator {
    /// Turn the indicator on or off
    fn set_on(&mut self, on: bool);

    /// Check if the indicator is currently on
    fn is_on(&self) -> bool;

    /// Invert the current state
    fn toggle(&mut self) {
        let on = self.is_on();
        self.set_on(!on);
    }
}

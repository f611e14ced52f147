//! System reset
//!
//! The reset request never returns: every piece of runtime state is lost
//! and the firmware starts again from its entry point.

/// Hardware reset primitive
pub trait SystemReset {
    /// Reset the microcontroller
    fn reset(&mut self) -> !;
}

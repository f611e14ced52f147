//! GPIO wrappers
//!
//! Thin newtypes so embassy pins can be handed to the board-agnostic
//! drivers in `matrixweather-drivers`.

use embassy_rp::gpio::{Input, Output};
use matrixweather_hal::{InputPin, OutputPin};

/// Push-pull output pin
pub struct RpOutput<'d>(Output<'d>);

impl<'d> RpOutput<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self(pin)
    }
}

impl OutputPin for RpOutput<'_> {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// Input pin (pull configured by the caller)
pub struct RpInput<'d>(Input<'d>);

impl<'d> RpInput<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self(pin)
    }
}

impl InputPin for RpInput<'_> {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}

//! GPIO status indicator
//!
//! An LED driven directly from a GPIO pin.

use matrixweather_core::traits::Indicator;
use matrixweather_hal::gpio::OutputPin;

/// Indicator LED on a GPIO output
///
/// The pin can be wired active-high (default) or active-low.
pub struct GpioIndicator<P> {
    pin: P,
    /// If true, indicator ON = pin LOW
    inverted: bool,
    on: bool,
}

impl<P: OutputPin> GpioIndicator<P> {
    /// Create an indicator, initially off
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut indicator = Self {
            pin,
            inverted,
            on: false,
        };
        indicator.set_on(false);
        indicator
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> Indicator for GpioIndicator<P> {
    fn set_on(&mut self, on: bool) {
        self.on = on;
        self.pin.set_level(on != self.inverted);
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

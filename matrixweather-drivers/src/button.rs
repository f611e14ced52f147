//! GPIO push-buttons

use matrixweather_core::traits::Button;
use matrixweather_hal::gpio::InputPin;

/// Push-button on a GPIO input
///
/// Matrix Portal style boards wire the buttons to ground with a pull-up,
/// so a pressed button reads low. Use `active_high` for the other wiring.
pub struct GpioButton<P> {
    pin: P,
    active_low: bool,
}

impl<P: InputPin> GpioButton<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    pub fn active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    pub fn active_high(pin: P) -> Self {
        Self::new(pin, false)
    }
}

impl<P: InputPin> Button for GpioButton<P> {
    fn is_pressed(&mut self) -> bool {
        self.pin.is_high() != self.active_low
    }
}

//! User input

/// A momentary push-button
pub trait Button {
    /// Whether the button is held down right now
    ///
    /// Takes `&mut self` because some inputs need a read cycle.
    fn is_pressed(&mut self) -> bool;
}

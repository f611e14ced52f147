//! Matrix backend trait
//!
//! Defines the interface to the physical panel. On the target this is a
//! serial link to the panel controller; in tests it is a recording fake.

use crate::frame::Frame;

/// Matrix backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Link to the panel failed or timed out
    Communication,
    /// Panel refused a command (panel-specific code)
    Rejected(u8),
    /// Command could not be encoded
    BufferOverflow,
}

/// Matrix backend trait
///
/// Brightness is the panel-level output scale in `0.0..=1.0`, independent
/// of the palette scaling applied to individual colours by the renderer.
pub trait MatrixBackend {
    /// Re-initialise the framebuffer at `bit_depth` bits per colour and clear it
    ///
    /// Panel brightness is left unchanged, so a level set beforehand still
    /// applies to the blank framebuffer.
    fn blank(&mut self, bit_depth: u8) -> Result<(), DisplayError>;

    /// Set the panel brightness, clamped to `0.0..=1.0`
    fn set_brightness(&mut self, level: f32) -> Result<(), DisplayError>;

    /// Last brightness written to the panel
    fn brightness(&self) -> f32;

    /// Draw a complete frame
    fn present(&mut self, frame: &Frame) -> Result<(), DisplayError>;
}

//! Frame description
//!
//! A `Frame` is everything the panel needs to draw one screen. Positions
//! are in rotated (portrait) panel pixels; label `x` is the left edge of
//! the text and `y` its vertical centre.

use heapless::String;

/// Number of text labels in the layout
pub const LABEL_COUNT: usize = 4;

/// Maximum label text length in bytes
pub const MAX_LABEL_TEXT: usize = 48;

/// Label slots, in palette order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LabelSlot {
    Temperature = 0,
    Description = 1,
    Humidity = 2,
    Wind = 3,
}

impl LabelSlot {
    pub const ALL: [LabelSlot; LABEL_COUNT] = [
        LabelSlot::Temperature,
        LabelSlot::Description,
        LabelSlot::Humidity,
        LabelSlot::Wind,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One positioned, coloured text label
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Label {
    pub text: String<MAX_LABEL_TEXT>,
    pub x: i16,
    pub y: i16,
    /// 0xRRGGBB after palette scaling
    pub color: u32,
}

/// Weather icon placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IconSprite {
    /// Index into the 16x16 sprite sheet
    pub sprite: u8,
    pub x: i16,
    pub y: i16,
    /// Palette scale (0-255) applied after the panel stretches its sprite
    /// sheet so the brightest channel is full scale
    pub level: u8,
}

/// Complete screen contents
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub labels: [Label; LABEL_COUNT],
    pub icon: Option<IconSprite>,
    /// While set, the panel shows its stored splash image at this palette
    /// level instead of the labels and icon
    pub splash: Option<u8>,
}

impl Frame {
    pub fn label(&self, slot: LabelSlot) -> &Label {
        &self.labels[slot.index()]
    }
}

//! Weather layout and panel abstraction for MatrixWeather
//!
//! This crate provides:
//! - `MatrixBackend` trait for the physical LED matrix (or the link to it)
//! - `Frame` - the complete description of what the panel should show
//! - `WeatherReport` - per-field extraction from a weather JSON document
//! - `WeatherGraphics` - the fixed portrait layout, description scrolling
//!   and brightness cascade to label colours and the icon palette
//! - Icon code mapping and palette brightness scaling
//!
//! # Layout
//!
//! The 64x32 panel is mounted rotated, giving a 32 px wide, 64 px tall
//! portrait canvas:
//!
//! ```text
//!   y  4   temperature (centred)
//!   y 12   16x16 weather icon
//!   y 34   wind (centred)
//!   y 45   humidity (centred)
//!   y 55   description (scrolling right to left)
//! ```

#![no_std]

pub mod backend;
pub mod frame;
pub mod graphics;
pub mod icon;
pub mod palette;
pub mod report;

// Re-export key types
pub use backend::{DisplayError, MatrixBackend};
pub use frame::{Frame, IconSprite, Label, LabelSlot, LABEL_COUNT, MAX_LABEL_TEXT};
pub use graphics::{GraphicsConfig, Units, WeatherGraphics, PLACEHOLDER};
pub use icon::{IconSelection, ICON_FAMILIES};
pub use palette::{fade_level, PaletteFader};
pub use report::{compass_point, WeatherReport};

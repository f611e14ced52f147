//! Weather graphics
//!
//! Owns the label texts, positions and colours, the description scroll
//! position and the icon selection, and produces the `Frame` handed to the
//! backend. Brightness changes go through the palette faders so label
//! colours, the icon level and the splash level always agree.
//!
//! A new renderer shows the splash screen; the first weather document
//! replaces it with the layout.

use core::fmt::Write;

use heapless::String;
use serde_json::Value;

use crate::frame::{Frame, IconSprite, LabelSlot, MAX_LABEL_TEXT};
use crate::icon::IconSelection;
use crate::palette::{fade_level, PaletteFader};
use crate::report::WeatherReport;

/// Text shown for a missing or malformed field
pub const PLACEHOLDER: &str = "--";

/// Glyph advance of the panel font in pixels
const GLYPH_WIDTH: i16 = 6;

/// Reference label colours, indexed by `LabelSlot`
const LABEL_COLORS: [u32; 4] = [
    0xFFFF00, // temperature: yellow
    0x0066FF, // description: blue
    0x00FFFF, // humidity: cyan
    0xFF00FF, // wind: purple
];

const TEMPERATURE_ANCHOR: (i16, i16) = (16, 4);
const WIND_ANCHOR: (i16, i16) = (16, 34);
const HUMIDITY_ANCHOR: (i16, i16) = (16, 45);
const DESCRIPTION_Y: i16 = 55;
const ICON_POSITION: (i16, i16) = (8, 12);

/// The icon sheet is dark artwork, faded linearly once normalised
const ICON_GAMMA: f32 = 1.0;
const SPLASH_GAMMA: f32 = 0.65;

/// Temperature units requested from the weather service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

impl Units {
    /// Query parameter value
    pub const fn as_str(self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }
}

/// Renderer configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GraphicsConfig {
    /// Canvas width in pixels (portrait)
    pub width: i16,
    /// Initial palette brightness
    pub brightness: f32,
    /// Label palette gamma
    pub gamma: f32,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            width: 32,
            brightness: 0.1,
            gamma: 1.0,
        }
    }
}

pub struct WeatherGraphics {
    config: GraphicsConfig,
    units: Units,
    labels: PaletteFader<4>,
    icon: Option<IconSelection>,
    frame: Frame,
}

impl WeatherGraphics {
    pub fn new(config: GraphicsConfig, units: Units) -> Self {
        let mut graphics = Self {
            config,
            units,
            labels: PaletteFader::new(LABEL_COLORS, config.brightness, config.gamma, false),
            icon: None,
            frame: Frame {
                splash: Some(fade_level(config.brightness, SPLASH_GAMMA)),
                ..Frame::default()
            },
        };

        for slot in LabelSlot::ALL {
            let label = &mut graphics.frame.labels[slot.index()];
            label.y = match slot {
                LabelSlot::Temperature => TEMPERATURE_ANCHOR.1,
                LabelSlot::Description => DESCRIPTION_Y,
                LabelSlot::Humidity => HUMIDITY_ANCHOR.1,
                LabelSlot::Wind => WIND_ANCHOR.1,
            };
        }
        graphics.frame.labels[LabelSlot::Description.index()].x = config.width;
        graphics.apply_colors();
        graphics
    }

    pub fn units(&self) -> Units {
        self.units
    }

    /// Update every field from a weather document
    ///
    /// Fields are handled independently; anything missing or of the wrong
    /// type is shown as `PLACEHOLDER` (the icon is cleared instead).
    pub fn display_weather(&mut self, weather: &Value) {
        let report = WeatherReport::from_json(weather);

        self.frame.splash = None;
        self.set_icon(report.icon);

        let mut text: String<MAX_LABEL_TEXT> = String::new();
        match (report.temperature, self.units) {
            (Some(t), Units::Metric) => {
                let _ = write!(text, "{:.1}° C", t);
            }
            (Some(t), Units::Imperial) => {
                let _ = write!(text, "{:.0}° F", t);
            }
            (None, _) => text.clear(),
        }
        self.set_centered(LabelSlot::Temperature, TEMPERATURE_ANCHOR.0, &text);

        text.clear();
        if let Some(humidity) = report.humidity {
            let _ = write!(text, "{:.0}%", humidity);
        }
        self.set_centered(LabelSlot::Humidity, HUMIDITY_ANCHOR.0, &text);

        text.clear();
        if let (Some(direction), Some(speed)) = (report.wind_direction(), report.wind_speed) {
            let _ = write!(text, "{} {:.0}", direction, speed);
        }
        self.set_centered(LabelSlot::Wind, WIND_ANCHOR.0, &text);

        text.clear();
        if let Some(description) = report.description {
            let mut chars = description.chars();
            if let Some(first) = chars.next() {
                push_fitting(&mut text, first.to_uppercase().chain(chars));
            }
        }
        self.set_description(&text);
    }

    /// Move the description one pixel left, wrapping once it has fully
    /// left the canvas
    pub fn scroll_description(&mut self) {
        let width = self.config.width;
        let label = &mut self.frame.labels[LabelSlot::Description.index()];
        let span = text_width(&label.text);

        label.x -= 1;
        if label.x < -span {
            label.x = width;
        }
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.labels.set_brightness(brightness);
        self.apply_colors();
    }

    pub fn brightness(&self) -> f32 {
        self.labels.brightness()
    }

    pub fn label_text(&self, slot: LabelSlot) -> &str {
        &self.frame.label(slot).text
    }

    pub fn icon(&self) -> Option<IconSelection> {
        self.icon
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn showing_splash(&self) -> bool {
        self.frame.splash.is_some()
    }

    fn set_icon(&mut self, code: Option<&str>) {
        let level = fade_level(self.brightness(), ICON_GAMMA);
        self.icon = code.and_then(IconSelection::from_code);
        self.frame.icon = self.icon.map(|selection| IconSprite {
            sprite: selection.sprite_index(),
            x: ICON_POSITION.0,
            y: ICON_POSITION.1,
            level,
        });
    }

    fn set_centered(&mut self, slot: LabelSlot, center_x: i16, text: &str) {
        let text = if text.is_empty() { PLACEHOLDER } else { text };
        let label = &mut self.frame.labels[slot.index()];
        label.text.clear();
        push_fitting(&mut label.text, text.chars());
        label.x = center_x - text_width(&label.text) / 2;
    }

    fn set_description(&mut self, text: &str) {
        let text = if text.is_empty() { PLACEHOLDER } else { text };
        let label = &mut self.frame.labels[LabelSlot::Description.index()];
        label.text.clear();
        push_fitting(&mut label.text, text.chars());
    }

    fn apply_colors(&mut self) {
        for slot in LabelSlot::ALL {
            self.frame.labels[slot.index()].color = self.labels.color(slot.index());
        }
        let brightness = self.brightness();
        if let Some(icon) = self.frame.icon.as_mut() {
            icon.level = fade_level(brightness, ICON_GAMMA);
        }
        if let Some(splash) = self.frame.splash.as_mut() {
            *splash = fade_level(brightness, SPLASH_GAMMA);
        }
    }
}

/// Append characters until the next one would not fit
fn push_fitting(out: &mut String<MAX_LABEL_TEXT>, chars: impl Iterator<Item = char>) {
    for c in chars {
        if out.push(c).is_err() {
            break;
        }
    }
}

fn text_width(text: &str) -> i16 {
    text.chars().count() as i16 * GLYPH_WIDTH
}

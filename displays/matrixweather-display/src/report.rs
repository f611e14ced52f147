//! Weather payload extraction
//!
//! Every field is read independently so that a missing or mistyped value
//! only affects its own label. Expected document shape (OpenWeatherMap
//! current weather):
//!
//! ```json
//! {
//!   "weather": [{ "icon": "10d", "description": "light rain" }],
//!   "main": { "temp": 54.3, "humidity": 87 },
//!   "wind": { "deg": 200, "speed": 6.9 }
//! }
//! ```

use serde_json::Value;

/// Sixteen-point compass reduced to eight named directions
const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Fields of interest, each `None` when absent or of the wrong type
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeatherReport<'a> {
    pub icon: Option<&'a str>,
    pub description: Option<&'a str>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_deg: Option<f64>,
    pub wind_speed: Option<f64>,
}

impl<'a> WeatherReport<'a> {
    pub fn from_json(weather: &'a Value) -> Self {
        let condition = weather.get("weather").and_then(|w| w.get(0));
        let text = |key: &str| condition.and_then(|c| c.get(key)).and_then(Value::as_str);
        let number = |pointer: &str| weather.pointer(pointer).and_then(Value::as_f64);

        Self {
            icon: text("icon"),
            description: text("description").filter(|d| !d.is_empty()),
            temperature: number("/main/temp"),
            humidity: number("/main/humidity"),
            wind_deg: number("/wind/deg"),
            wind_speed: number("/wind/speed"),
        }
    }

    /// Compass text for the wind direction
    pub fn wind_direction(&self) -> Option<&'static str> {
        self.wind_deg.map(compass_point)
    }
}

/// Name of the 45° sector containing `deg`, sectors centred on north
pub fn compass_point(deg: f64) -> &'static str {
    let mut shifted = libm::fmod(deg + 22.5, 360.0);
    if shifted < 0.0 {
        shifted += 360.0;
    }
    let index = (shifted / 45.0) as usize;
    COMPASS[index.min(COMPASS.len() - 1)]
}

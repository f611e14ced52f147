//! Weather request URL

use core::fmt::Write;

use heapless::String;

use super::types::{Secrets, WeatherSettings};
use crate::error::ConfigError;

pub const MAX_URL_LEN: usize = 256;

pub type WeatherUrl = String<MAX_URL_LEN>;

const DATA_SOURCE: &str = "http://api.openweathermap.org/data/2.5/weather";

/// Build the current-weather query for the configured location
///
/// Spaces in the location are percent-encoded; everything else is passed
/// through as written in the settings.
pub fn weather_url(weather: &WeatherSettings, secrets: &Secrets) -> Result<WeatherUrl, ConfigError> {
    let mut url = WeatherUrl::new();
    write!(url, "{}?q=", DATA_SOURCE).map_err(|_| ConfigError::TooLong)?;
    for c in weather.location.chars() {
        let pushed = if c == ' ' {
            url.push_str("%20")
        } else {
            url.push(c).map_err(|_| ())
        };
        pushed.map_err(|_| ConfigError::TooLong)?;
    }
    write!(
        url,
        "&units={}&appid={}",
        weather.units.as_str(),
        secrets.openweather_token
    )
    .map_err(|_| ConfigError::TooLong)?;
    Ok(url)
}

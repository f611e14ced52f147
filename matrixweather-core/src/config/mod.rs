//! Configuration
//!
//! Settings are a small TOML document compiled into the firmware and
//! parsed at startup by a `no_std` line parser.

pub mod parse;
pub mod types;
pub mod url;

pub use parse::{parse_document, parse_settings};
pub use types::*;
pub use url::{weather_url, WeatherUrl, MAX_URL_LEN};

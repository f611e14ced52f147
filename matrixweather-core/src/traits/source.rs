//! External data sources
//!
//! The weather service and the network time source sit behind these
//! traits. On the target both are served by the network co-processor.

use serde_json::Value;

/// Errors from a fetch against a remote source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// Could not join the network or reach the co-processor
    Network,
    /// No complete response within the deadline
    Timeout,
    /// Server answered with a non-success HTTP status
    Status(u16),
    /// Response body is not a valid JSON document
    InvalidBody,
    /// Response body exceeds the receive buffer
    TooLarge,
}

impl FetchError {
    pub fn message(&self) -> &'static str {
        match self {
            FetchError::Network => "network unavailable",
            FetchError::Timeout => "request timed out",
            FetchError::Status(_) => "unexpected HTTP status",
            FetchError::InvalidBody => "invalid response body",
            FetchError::TooLarge => "response too large",
        }
    }
}

/// Weather data source
pub trait WeatherSource {
    /// GET `url` and parse the body as JSON
    fn fetch(&mut self, url: &str) -> Result<Value, FetchError>;
}

/// Wall-clock time source
pub trait TimeSource {
    /// Current UTC time in seconds since the Unix epoch
    fn sync_time(&mut self) -> Result<u64, FetchError>;
}

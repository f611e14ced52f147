//! Error types
//!
//! Everything below the supervisor reports failure through `AppError`.
//! The supervisor itself only fails with `SupervisorError`.

use matrixweather_display::DisplayError;

pub use crate::traits::FetchError;

/// Settings document and credential errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed `[section]` header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Line is neither a header, a comment nor `key = value`
    InvalidLine,
    /// String value longer than its field
    TooLong,
    /// `[secrets]` lacks a required key
    MissingSecret(&'static str),
}

impl ConfigError {
    pub fn message(&self) -> &'static str {
        match self {
            ConfigError::InvalidSection => "invalid section header",
            ConfigError::InvalidValue => "invalid setting value",
            ConfigError::InvalidLine => "malformed settings line",
            ConfigError::TooLong => "setting value too long",
            ConfigError::MissingSecret(_) => "WiFi secrets are kept in the [secrets] section, please add them there",
        }
    }
}

/// A failure raised by one step of the primary loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppError {
    Config(ConfigError),
    Fetch(FetchError),
    Display(DisplayError),
}

impl AppError {
    pub fn message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.message(),
            AppError::Fetch(e) => e.message(),
            AppError::Display(DisplayError::Communication) => "panel link failed",
            AppError::Display(DisplayError::Rejected(_)) => "panel rejected command",
            AppError::Display(DisplayError::BufferOverflow) => "panel command too large",
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        AppError::Fetch(e)
    }
}

impl From<DisplayError> for AppError {
    fn from(e: DisplayError) -> Self {
        AppError::Display(e)
    }
}

/// Failures the supervisor does not handle itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SupervisorError {
    /// Supervision disabled: the primary failure, passed through unmodified
    Unsupervised(AppError),
    /// The degraded display setup itself failed
    Degraded(DisplayError),
}

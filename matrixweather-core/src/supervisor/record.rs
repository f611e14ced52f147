//! Failure record

use crate::error::AppError;

/// Broad failure category, for the log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailureKind {
    Config,
    Fetch,
    Display,
}

/// The failure that took the device into degraded mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FailureRecord {
    pub kind: FailureKind,
    pub message: &'static str,
    /// Monotonic timestamp of the failure
    pub at_ms: u64,
    pub cause: AppError,
}

impl FailureRecord {
    pub fn new(cause: AppError, at_ms: u64) -> Self {
        let kind = match cause {
            AppError::Config(_) => FailureKind::Config,
            AppError::Fetch(_) => FailureKind::Fetch,
            AppError::Display(_) => FailureKind::Display,
        };
        Self {
            kind,
            message: cause.message(),
            at_ms,
            cause,
        }
    }
}

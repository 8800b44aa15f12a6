//! Error types for counter configuration and remote measurements.

use thiserror::Error;

/// A rejected configuration value. The setter that produced it leaves the
/// previous value in place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("counting time of {requested} seconds is too long to wait ({max} seconds max)")]
    CountingTimeTooLong { requested: f64, max: f64 },

    #[error("counting time must not be negative (got {0} seconds)")]
    NegativeCountingTime(f64),

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("efficiency must be between 0 and 1 (got {0})")]
    EfficiencyOutOfRange(f64),

    #[error("background rate cannot be negative (got {0} Hz)")]
    NegativeBackground(f64),
}

/// Failure to obtain a count from a counting service.
#[derive(Debug, Error)]
pub enum MeasurementError {
    /// Connection failure, timeout, HTTP error status or undecodable body.
    #[error("error retrieving data from the detector: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("detector unavailable: {0}")]
    Unavailable(String),
}

impl MeasurementError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

//! Error types for altimetry data access.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias using AltiError.
pub type AltiResult<T> = Result<T, AltiError>;

/// Primary error type for altimetry queries.
#[derive(Debug, Error)]
pub enum AltiError {
    // === Request Errors ===
    #[error("Invalid period: start {start} is after end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Invalid half-orbit specification: {0}")]
    InvalidHalfOrbit(String),

    #[error("Invalid polygon: {0}")]
    InvalidPolygon(String),

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    // === Data Errors ===
    #[error("Missing coordinate variable: {0}")]
    MissingCoordinate(String),

    #[error("Shape mismatch for '{name}': expected {expected} values, got {actual}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Variable '{name}' is not {expected}")]
    DataType { name: String, expected: &'static str },

    #[error("Cannot combine datasets: {0}")]
    IncompatibleDatasets(String),

    // === Backend Errors ===
    #[error("Collection error: {0}")]
    Collection(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_invalid_range_message() {
        let err = AltiError::InvalidRange {
            start: Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2020-01-02"));
        assert!(msg.contains("after"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = AltiError::from(io);
        assert!(matches!(err, AltiError::Io(_)));
        assert_eq!(err.to_string(), "I/O error: missing");
    }
}

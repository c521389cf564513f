//! Error types for the ronda factor engine.
//!
//! This module defines the error taxonomy used throughout the ronda
//! ecosystem. Caller input errors (empty ranges, unknown period tags) are
//! fatal and surface synchronously; per-date computation errors are isolated
//! by the engine and only degrade output completeness.

use crate::types::Date;
use thiserror::Error;

/// The main error type for ronda operations.
#[derive(Debug, Error)]
pub enum RondaError {
    /// A date range whose start lies after its end.
    #[error("empty date range: {from} is after {to}")]
    EmptyRange {
        /// Requested range start.
        from: Date,
        /// Requested range end.
        to: Date,
    },

    /// An unrecognized period tag was supplied to a calendar grouping.
    #[error("invalid period tag: {0} (expected one of m, q, y)")]
    InvalidPeriod(String),

    /// A date could not be resolved against the trading calendar.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// A required column is missing from a table.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// A named series does not exist in the backing store.
    #[error("series not found in store: {0}")]
    MissingSeries(String),

    /// A feature was requested without the configuration it needs.
    #[error("missing configuration: {0}")]
    MissingConfiguration(String),

    /// Not enough observations to carry out the requested computation.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// A single date's factor computation failed.
    #[error("factor computation failed: {0}")]
    Computation(String),

    /// Error from Polars operations.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Error from the persistence adapter.
    #[error("store error: {0}")]
    Store(String),

    /// A chunked write failed part-way through; reports what made it in.
    #[error(
        "store write to '{series}' failed after {persisted} rows ({remaining} remaining): {cause}"
    )]
    PartialWrite {
        /// Series the write was addressed to.
        series: String,
        /// Rows durably persisted before the failure.
        persisted: usize,
        /// Rows that were not written.
        remaining: usize,
        /// Underlying store error.
        cause: String,
    },

    /// Generic error for other cases.
    #[error("error: {0}")]
    Other(String),
}

impl From<String> for RondaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for RondaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for ronda operations.
pub type Result<T> = std::result::Result<T, RondaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let from = Date::from_ymd_opt(2021, 10, 8).unwrap();
        let to = Date::from_ymd_opt(2021, 10, 1).unwrap();
        let err = RondaError::EmptyRange { from, to };
        assert_eq!(err.to_string(), "empty date range: 2021-10-08 is after 2021-10-01");

        let err = RondaError::InvalidPeriod("w".to_string());
        assert!(err.to_string().contains("invalid period tag: w"));
    }

    #[test]
    fn test_partial_write_display() {
        let err = RondaError::PartialWrite {
            series: "bayes_beta_250".to_string(),
            persisted: 200_000,
            remaining: 50_000,
            cause: "disk full".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("200000 rows"));
        assert!(msg.contains("50000 remaining"));
    }

    #[test]
    fn test_error_from_string() {
        let err: RondaError = "boom".into();
        assert!(matches!(err, RondaError::Other(_)));
    }
}

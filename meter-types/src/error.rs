//! Error types for snapshot decoding.

use thiserror::Error;

/// A record timestamp that could not be parsed.
#[derive(Debug, Error)]
pub enum TimestampError {
    /// The timestamp string was empty or whitespace.
    #[error("timestamp is empty")]
    Empty,

    /// The timestamp did not match `year-month-day hour:minute`.
    #[error("invalid timestamp {value:?}: {source}")]
    Invalid {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// A snapshot document that could not be decoded.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The document is not JSON, or its shape is not a year/month/day/record tree.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

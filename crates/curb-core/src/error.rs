//! # Validation Errors
//!
//! Structured validation errors for the foundational types. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations and
//! carry enough context to produce a useful client-facing message without
//! string matching.

use thiserror::Error;

/// Validation failure for a foundational type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Marker code was empty (or whitespace-only).
    #[error("marker code must not be empty")]
    EmptyMarkerCode,

    /// Marker code contained interior whitespace.
    #[error("marker code must not contain whitespace: {0:?}")]
    MarkerCodeWhitespace(String),

    /// Marker code exceeded the maximum length.
    #[error("marker code must not exceed {max} characters, got {len}")]
    MarkerCodeTooLong {
        /// Observed length in characters.
        len: usize,
        /// Maximum permitted length.
        max: usize,
    },

    /// Timestamp string was not valid RFC 3339 or used a non-UTC offset.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A configured duration was zero or negative.
    #[error("{name} must be positive, got {value}")]
    NonPositiveDuration {
        /// Name of the offending configuration field.
        name: &'static str,
        /// The rejected value in seconds.
        value: i64,
    },

    /// A configured duration could not be parsed as whole seconds.
    #[error("{name} must be a whole number of seconds, got {raw:?}")]
    UnparseableDuration {
        /// Name of the offending configuration field.
        name: &'static str,
        /// The raw value that failed to parse.
        raw: String,
    },
}

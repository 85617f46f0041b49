//! Curb API client error types.

use curb_core::Timestamp;

/// Errors from Curb API calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error (includes timeouts — outcome unknown).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The API returned a structured error response.
    #[error("Curb API {endpoint} returned {status} {code}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        /// Machine-readable error code (e.g. "TOO_EARLY").
        code: String,
        message: String,
        /// Populated on `TOO_EARLY` responses for countdown display.
        eligible_final_at: Option<Timestamp>,
    },

    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },

    /// Client configuration error (bad base URL, builder failure).
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether this error means the request outcome is unknown (transport
    /// failure or timeout) and the caller should re-fetch state.
    pub fn is_unknown_outcome(&self) -> bool {
        matches!(self, Self::Http { .. })
    }
}

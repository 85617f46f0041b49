//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC-only timestamp type truncated to seconds
//! precision, rendering as ISO8601 with Z suffix.
//!
//! ## Invariant
//!
//! Every timestamp in a declaration (`declaredAt`, `eligibleFinalAt`,
//! `expiresAt`, `finalizedAt`) must serialize and re-parse to the identical
//! instant. Sub-second components and local offsets would break that
//! round-trip, so both are rejected at construction: non-UTC inputs are
//! refused rather than silently converted, and nanoseconds are truncated.
//!
//! All deadline arithmetic (eligibility delay, auto-expiry) flows through
//! [`Timestamp::add_secs`] so the derived instants stay on second
//! boundaries.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`] — from an ISO8601 string, rejecting non-UTC offsets.
/// - [`Timestamp::unix_epoch()`] — 1970-01-01T00:00:00Z (test-hook floor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// The Unix epoch (1970-01-01T00:00:00Z).
    ///
    /// Used by the test-support hook that forces a declaration's
    /// eligibility instant into the past.
    pub fn unix_epoch() -> Self {
        Self(DateTime::UNIX_EPOCH)
    }

    /// Parse a timestamp from an RFC 3339 / ISO8601 string.
    ///
    /// **Rejects non-UTC inputs.** Only timestamps with the `Z` suffix are
    /// accepted — even `+00:00`, which is semantically equivalent to `Z`, is
    /// refused so that the wire representation stays canonical.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid RFC 3339 or uses a
    /// non-Z timezone offset.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if !s.ends_with('Z') {
            return Err(ValidationError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }

        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            ValidationError::InvalidTimestamp(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;

        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Parse a timestamp from an RFC 3339 string, accepting any timezone
    /// offset and converting to UTC.
    ///
    /// Lenient parser for ingesting external data (e.g. responses from a
    /// server that serializes offsets). The result is always UTC with
    /// seconds precision, matching the strict invariant.
    pub fn parse_lenient(s: &str) -> Result<Self, ValidationError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            ValidationError::InvalidTimestamp(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, ValidationError> {
        let dt = DateTime::from_timestamp(secs, 0).ok_or_else(|| {
            ValidationError::InvalidTimestamp(format!("invalid Unix timestamp: {secs}"))
        })?;
        Ok(Self(dt))
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Return this timestamp shifted forward by `secs` seconds.
    ///
    /// Negative values shift backward. A shift past the representable
    /// range leaves the instant unchanged rather than wrapping.
    pub fn add_secs(&self, secs: i64) -> Self {
        Self(
            self.0
                .checked_add_signed(Duration::seconds(secs))
                .unwrap_or(self.0),
        )
    }

    /// Signed whole seconds from `self` until `later`.
    ///
    /// Negative when `later` precedes `self`. Callers that display
    /// countdowns clamp at zero; this function does not.
    pub fn seconds_until(&self, later: Timestamp) -> i64 {
        later.0.timestamp() - self.0.timestamp()
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-08-05T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

//! # Marker Codes
//!
//! Validated newtype for marker identifiers. A marker code is assigned
//! externally (printed on the physical tag and scanned from its QR code),
//! so the service treats it as opaque — but not unbounded: codes are
//! trimmed, must be non-empty, contain no interior whitespace, and stay
//! within a length cap so they are safe as store keys and path segments.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum length of a marker code in characters.
pub const MAX_MARKER_CODE_LEN: usize = 128;

/// Externally assigned identifier of a physical marker.
///
/// Serializes as a plain string. Validated on construction via
/// [`MarkerCode::new`]; deserialized values pass through the same
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MarkerCode(String);

impl MarkerCode {
    /// Create a validated marker code.
    ///
    /// Leading/trailing whitespace is trimmed. Returns an error if the
    /// trimmed code is empty, contains interior whitespace, or exceeds
    /// [`MAX_MARKER_CODE_LEN`] characters.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyMarkerCode);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::MarkerCodeWhitespace(trimmed.to_string()));
        }
        let len = trimmed.chars().count();
        if len > MAX_MARKER_CODE_LEN {
            return Err(ValidationError::MarkerCodeTooLong {
                len,
                max: MAX_MARKER_CODE_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Return the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MarkerCode {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<MarkerCode> for String {
    fn from(code: MarkerCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for MarkerCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for MarkerCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

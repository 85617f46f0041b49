//! # Unlock Windows — Duration Configuration
//!
//! The two clocks a temporary unlock starts: the eligibility delay (how
//! long before final unlock is permitted) and the auto-expiry window (how
//! long the temporary state survives). Both are configuration, not
//! literals — deployments tune them, and tests shrink them.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::temporal::Timestamp;

/// Default delay before final unlock becomes permitted: 15 minutes.
pub const ELIGIBILITY_DELAY_SECS: i64 = 900;

/// Default window after which a temporary unlock auto-expires: 24 hours.
pub const AUTO_EXPIRE_SECS: i64 = 86_400;

/// The duration configuration for declaration clocks.
///
/// Derives both declaration deadlines from a declaration instant so call
/// sites cannot disagree about the offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockWindows {
    /// Seconds from `declaredAt` until final unlock is permitted.
    pub eligibility_delay_secs: i64,
    /// Seconds from `declaredAt` until the temporary state auto-expires.
    pub auto_expire_secs: i64,
}

impl UnlockWindows {
    /// Create a window configuration, rejecting non-positive durations.
    pub fn new(eligibility_delay_secs: i64, auto_expire_secs: i64) -> Result<Self, ValidationError> {
        if eligibility_delay_secs <= 0 {
            return Err(ValidationError::NonPositiveDuration {
                name: "eligibility_delay_secs",
                value: eligibility_delay_secs,
            });
        }
        if auto_expire_secs <= 0 {
            return Err(ValidationError::NonPositiveDuration {
                name: "auto_expire_secs",
                value: auto_expire_secs,
            });
        }
        Ok(Self {
            eligibility_delay_secs,
            auto_expire_secs,
        })
    }

    /// The instant final unlock becomes permitted for a declaration made at
    /// `declared_at`.
    pub fn eligible_final_from(&self, declared_at: Timestamp) -> Timestamp {
        declared_at.add_secs(self.eligibility_delay_secs)
    }

    /// The instant the temporary state auto-expires for a declaration made
    /// at `declared_at`.
    pub fn expires_from(&self, declared_at: Timestamp) -> Timestamp {
        declared_at.add_secs(self.auto_expire_secs)
    }
}

impl Default for UnlockWindows {
    fn default() -> Self {
        Self {
            eligibility_delay_secs: ELIGIBILITY_DELAY_SECS,
            auto_expire_secs: AUTO_EXPIRE_SECS,
        }
    }
}

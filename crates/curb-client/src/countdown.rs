//! # Countdown Presenter
//!
//! Pure per-tick computation: one authoritative `now` in, display values
//! out. Zero and negative durations render as 0 seconds — the presenter
//! never shows a negative countdown.

use curb_core::Timestamp;
use curb_state::{Declaration, DeclarationStatus};

/// Display values derived from a declaration at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownView {
    /// Whether the local clocks say final unlock is permitted. Advisory
    /// only — the server re-checks on the actual request.
    pub eligible: bool,
    /// Seconds until `eligibleFinalAt`, clamped at zero.
    pub secs_to_eligible: u64,
    /// Seconds until `expiresAt`, clamped at zero.
    pub secs_to_expiry: u64,
    /// Whether the temporary state has auto-expired.
    pub expired: bool,
    /// Whether the declaration is already finalized.
    pub finalized: bool,
}

impl CountdownView {
    /// Compute display values from `declaration` at `now`.
    ///
    /// Total over any pair of instants: a declaration "from the future"
    /// (client clock behind the server) simply shows full countdowns.
    pub fn compute(declaration: &Declaration, now: Timestamp) -> Self {
        let finalized = declaration.status == DeclarationStatus::Finalized;
        let secs_to_eligible = clamp(now.seconds_until(declaration.eligible_final_at));
        let secs_to_expiry = clamp(now.seconds_until(declaration.expires_at));
        Self {
            eligible: !finalized && secs_to_eligible == 0,
            secs_to_eligible,
            secs_to_expiry,
            expired: declaration.is_expired(now),
            finalized,
        }
    }
}

fn clamp(secs: i64) -> u64 {
    secs.max(0) as u64
}

/// Render a second count as a short human-readable duration:
/// `0s`, `45s`, `2m 3s`, `1h 5s`, `1h 2m 3s`.
pub fn format_duration(secs: u64) -> String {
    let s = secs % 60;
    let m = (secs / 60) % 60;
    let h = secs / 3600;

    if h > 0 {
        if m > 0 {
            format!("{h}h {m}m {s}s")
        } else {
            format!("{h}h {s}s")
        }
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

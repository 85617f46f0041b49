//! # Eligibility Policy
//!
//! The pure function deciding whether final unlock is currently permitted.
//! Total over any pair of timestamps — `now` before `declaredAt` is just
//! "not eligible", not an error.
//!
//! Callers must not cache the result across time: the unlock machine
//! re-evaluates this at commit time, under the store lock, with a fresh
//! `now` from the same clock that stamps `finalizedAt`.

use curb_core::Timestamp;

use crate::declaration::{Declaration, DeclarationStatus};

/// Whether final unlock is permitted for `declaration` at `now`.
///
/// Defined as `status == temporary && now >= eligibleFinalAt`. A finalized
/// declaration is never eligible (it has nothing left to finalize).
pub fn is_final_eligible(declaration: &Declaration, now: Timestamp) -> bool {
    declaration.status == DeclarationStatus::Temporary && now >= declaration.eligible_final_at
}

/// Non-negative seconds remaining until `declaration` becomes eligible at
/// `now`. Zero when already eligible (or finalized — there is nothing to
/// wait for).
pub fn remaining_until_eligible(declaration: &Declaration, now: Timestamp) -> i64 {
    if declaration.status != DeclarationStatus::Temporary {
        return 0;
    }
    now.seconds_until(declaration.eligible_final_at).max(0)
}

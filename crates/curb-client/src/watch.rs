//! # Countdown Loop
//!
//! The cooperative 1 Hz tick loop behind `curb watch`. Each tick is
//! synchronous and fast: one `Timestamp::now()` read, one
//! [`CountdownView`] computation against the cached declaration, one
//! render callback. No tick overlaps another, and the loop never
//! re-fetches server state — the authoritative eligibility check stays
//! with the final-unlock request itself.

use std::time::Duration;

use curb_core::Timestamp;
use curb_state::Declaration;

use crate::countdown::CountdownView;

/// Why the countdown loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEnd {
    /// The eligibility instant arrived — final unlock may be requested.
    Eligible,
    /// The temporary state auto-expired before eligibility was used.
    Expired,
    /// The declaration was already finalized.
    Finalized,
}

/// Run the 1 Hz countdown against a cached declaration until a boundary
/// is crossed, invoking `render` once per tick.
///
/// The first tick fires immediately, so an already-eligible (or
/// finalized) declaration renders once and returns without waiting.
pub async fn run_countdown<F>(declaration: &Declaration, mut render: F) -> WatchEnd
where
    F: FnMut(&CountdownView),
{
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;

        let now = Timestamp::now();
        let view = CountdownView::compute(declaration, now);
        render(&view);

        if view.finalized {
            return WatchEnd::Finalized;
        }
        if view.expired {
            return WatchEnd::Expired;
        }
        if view.eligible {
            return WatchEnd::Eligible;
        }
    }
}

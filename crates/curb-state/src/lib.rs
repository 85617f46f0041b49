//! # curb-state — Marker Declaration State Machine
//!
//! Implements the temporal state machine governing marker declarations:
//! a marker with no declaration can be temporarily unlocked (starting the
//! eligibility and auto-expiry clocks), and once the eligibility instant
//! has passed, permanently unlocked exactly once.
//!
//! ```text
//! NoDeclaration ──temp-unlock──▶ Temporary ──final-unlock──▶ Finalized
//!       ▲                           │  ▲                        │
//!       │                           └──┘ temp-unlock            │
//!       │                              (restarts both clocks)   │
//!       └────────────── temp-unlock (new declaration) ◀─────────┘
//! ```
//!
//! ## Modules
//!
//! - **Declaration** (`declaration.rs`): the declaration record, its status
//!   enum, and the report mirror kept in sync with it.
//!
//! - **Policy** (`policy.rs`): the pure eligibility function. Total over any
//!   two timestamps; the machine re-evaluates it at commit time instead of
//!   trusting anything computed earlier.
//!
//! - **Store** (`store.rs`): the keyed declaration store seam. The in-memory
//!   implementation serializes per-marker read-check-write sequences under
//!   its write lock, which is what makes racing final unlocks resolve to
//!   exactly one winner.
//!
//! - **Machine** (`machine.rs`): the two transitions, their error taxonomy,
//!   and the single coupon issuance per final unlock.

pub mod declaration;
pub mod machine;
pub mod policy;
pub mod store;

pub use declaration::{
    Declaration, DeclarationStatus, Marker, MarkerEntry, Report, ReportStatus, MAX_NOTES_LEN,
};
pub use machine::{FinalUnlockOutcome, UnlockError, UnlockMachine};
pub use policy::{is_final_eligible, remaining_until_eligible};
pub use store::{MarkerStore, MemoryMarkerStore};

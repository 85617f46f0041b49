//! # curb-client — Typed Client & Countdown Presenter
//!
//! The owner-facing half of the unlock workflow: a typed reqwest client
//! for the Curb API and the countdown presenter that turns a cached
//! declaration into display values once per tick.
//!
//! ## Unknown-outcome handling
//!
//! A network timeout on an unlock request means the outcome is unknown —
//! the server may or may not have committed. Callers resolve that by
//! re-fetching marker state, never by blind retry. (Retrying temp-unlock
//! is safe anyway — it is a create-or-replace; retrying final-unlock
//! against a committed transition fails cleanly with `ALREADY_FINALIZED`
//! and cannot double-issue a coupon.)

pub mod client;
pub mod countdown;
pub mod error;
pub mod watch;

pub use client::{ClientConfig, FinalUnlockResult, MarkerClient, MarkerCoupons};
pub use countdown::{format_duration, CountdownView};
pub use error::ClientError;
pub use watch::{run_countdown, WatchEnd};

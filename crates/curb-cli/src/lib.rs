//! # curb-cli — CLI Tool for the Curb API
//!
//! Provides the `curb` command-line interface for driving the
//! marker-unlock workflow from a terminal.
//!
//! ## Subcommands
//!
//! - `curb show <code>` — Current marker state with countdowns.
//! - `curb temp <code> [--notes ..]` — Temporarily unlock a marker.
//! - `curb final <code> [--email ..]` — Permanently unlock a marker.
//! - `curb coupons <code>` — Coupons issued against a marker.
//! - `curb watch <code>` — Live 1 Hz countdown until eligibility.

pub mod markers;
pub mod watch;

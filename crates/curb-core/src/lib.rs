//! # curb-core — Foundational Types for Curb Stack
//!
//! This crate is the bedrock of Curb Stack. It defines the type-system
//! primitives every other crate in the workspace builds on; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `MarkerCode` is a validated
//!    newtype — no bare strings for marker identifiers.
//!
//! 2. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z suffix
//!    and seconds precision, so the declaration wire format round-trips
//!    exactly.
//!
//! 3. **Durations are configuration, not literals.** The eligibility delay
//!    and auto-expiry offsets live in [`UnlockWindows`]; call sites derive
//!    deadlines through it instead of hard-coding offsets.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `curb-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod marker;
pub mod temporal;
pub mod window;

pub use error::ValidationError;
pub use marker::MarkerCode;
pub use temporal::Timestamp;
pub use window::{UnlockWindows, AUTO_EXPIRE_SECS, ELIGIBILITY_DELAY_SECS};

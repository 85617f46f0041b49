//! # curb-coupon — Coupon Issuance Collaborator
//!
//! The reward side of the marker-unlock workflow: when an owner completes a
//! final unlock, the shop association grants a coupon. This crate owns that
//! concern end to end — the issuance interface the unlock machine calls, the
//! coupon template catalog, and the issuance lifecycle
//! (`active → used | expired`) with its own expiry clock.
//!
//! ## Design
//!
//! The unlock machine consumes coupons only through the [`CouponIssuer`]
//! trait, so the backing service is swappable: [`MemoryCouponIssuer`] here,
//! a shop-association API client in a deployment. Implementations are
//! constructed once at process start and injected — there is no lazy
//! global.
//!
//! Issuance is best-effort from the caller's point of view: "no template
//! configured" is `Ok(None)`, not an error, and callers are expected to
//! treat `Err` as a degraded dependency rather than a failed unlock.

pub mod info;
pub mod issuer;
pub mod memory;

pub use info::{CouponInfo, DiscountType};
pub use issuer::{CouponError, CouponIssuer};
pub use memory::{CouponTemplate, IssuanceStatus, MemoryCouponIssuer};

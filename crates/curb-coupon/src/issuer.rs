//! # Issuance Interface
//!
//! The seam between the unlock workflow and whatever grants coupons. The
//! unlock machine holds an `Arc<dyn CouponIssuer>` and never sees past this
//! trait.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use curb_core::MarkerCode;

use crate::info::CouponInfo;

/// Errors from the coupon collaborator.
#[derive(Error, Debug)]
pub enum CouponError {
    /// No issuance exists with the given id.
    #[error("coupon issuance {0} not found")]
    NotFound(Uuid),

    /// The issuance exists but is not in `active` status.
    #[error("coupon issuance {0} is not active")]
    NotActive(Uuid),

    /// The issuance's own expiry clock has run out.
    #[error("coupon issuance {0} has expired")]
    Expired(Uuid),

    /// The backing service failed or is unreachable.
    #[error("coupon service unavailable: {0}")]
    Unavailable(String),
}

/// The coupon collaborator consumed by the unlock state machine.
///
/// `issue_for_final_unlock` must be invoked at most once per successful
/// final unlock; the caller guarantees that by only calling it after
/// winning the `temporary → finalized` transition. Conversely, the issuer
/// guarantees at most one coupon per call — `Ok(None)` means no template
/// is currently available, which is a normal outcome, not a failure.
#[async_trait]
pub trait CouponIssuer: Send + Sync {
    /// Issue a coupon for a completed final unlock, binding the most
    /// recently configured active template to the marker (and optional
    /// owner contact). Returns `Ok(None)` when no template is available.
    async fn issue_for_final_unlock(
        &self,
        marker: &MarkerCode,
        owner_email: Option<&str>,
    ) -> Result<Option<CouponInfo>, CouponError>;

    /// All coupons issued against a marker, newest first. Includes used
    /// coupons (owners can review them) but not expired ones.
    async fn coupons_for_marker(&self, marker: &MarkerCode)
        -> Result<Vec<CouponInfo>, CouponError>;

    /// Redeem an issued coupon, moving it `active → used`.
    ///
    /// An issuance past its expiry instant is moved to `expired` and the
    /// call fails with [`CouponError::Expired`].
    async fn redeem(&self, issuance_id: Uuid) -> Result<(), CouponError>;
}

//! # Unlock State Machine
//!
//! Orchestrates the two externally triggered transitions over the
//! declaration store, and invokes the coupon collaborator exactly once per
//! successful final unlock.
//!
//! ## Transition rules
//!
//! - **temp-unlock** always succeeds. It creates or replaces the current
//!   declaration and restarts both clocks from the moment of the call —
//!   repeated calls resetting the timer is intended behavior, and calling
//!   it on a finalized declaration starts a fresh cycle.
//!
//! - **final-unlock** re-checks everything server-side at the instant of
//!   the call, inside the store's critical section: a declaration must
//!   exist, be `temporary`, and be past its eligibility instant. Each
//!   failure mode has its own error. Two racing calls resolve to exactly
//!   one winner; the loser observes the already-finalized declaration.
//!
//! Coupon issuance happens after the transition commits, outside the
//! lock. Issuance failure is logged and degrades to "no coupon" — it never
//! rolls back a finalization.

use std::sync::Arc;

use thiserror::Error;

use curb_core::{MarkerCode, Timestamp, UnlockWindows};
use curb_coupon::{CouponInfo, CouponIssuer};

use crate::declaration::{Declaration, DeclarationStatus, MarkerEntry, ReportStatus};
use crate::policy;
use crate::store::MarkerStore;

// ─── Errors ──────────────────────────────────────────────────────────

/// Failure modes of the final-unlock transition.
///
/// `NoDeclaration` and `AlreadyFinalized` are deliberately distinct: the
/// first means the marker has no current declaration at all, the second
/// that the cycle already completed. Conflating them would make a
/// double-submitted final unlock indistinguishable from a typo'd code.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnlockError {
    /// The marker has no current declaration.
    #[error("marker {code} has no declaration")]
    NoDeclaration {
        /// The marker that was addressed.
        code: MarkerCode,
    },

    /// The declaration exists but its eligibility instant has not arrived.
    #[error("marker {code} is not eligible for final unlock until {eligible_final_at}")]
    TooEarly {
        /// The marker that was addressed.
        code: MarkerCode,
        /// When final unlock becomes permitted.
        eligible_final_at: Timestamp,
        /// The server clock reading that failed the check.
        now: Timestamp,
    },

    /// The declaration was already finalized.
    #[error("marker {code} is already finalized")]
    AlreadyFinalized {
        /// The marker that was addressed.
        code: MarkerCode,
        /// When the earlier finalization happened.
        finalized_at: Option<Timestamp>,
    },
}

// ─── Outcome ─────────────────────────────────────────────────────────

/// Result of a successful final unlock.
#[derive(Debug, Clone)]
pub struct FinalUnlockOutcome {
    /// The instant the transition committed.
    pub finalized_at: Timestamp,
    /// The report status after the transition (always `resolved`).
    pub report_status: ReportStatus,
    /// The issued coupon, if a template was available and issuance
    /// succeeded.
    pub coupon: Option<CouponInfo>,
}

// ─── Machine ─────────────────────────────────────────────────────────

/// The unlock state machine: store, coupon collaborator, and window
/// configuration, wired once at process start.
pub struct UnlockMachine<S: MarkerStore> {
    store: S,
    issuer: Arc<dyn CouponIssuer>,
    windows: UnlockWindows,
}

impl<S: MarkerStore> UnlockMachine<S> {
    /// Create a machine over the given store and coupon collaborator.
    pub fn new(store: S, issuer: Arc<dyn CouponIssuer>, windows: UnlockWindows) -> Self {
        Self {
            store,
            issuer,
            windows,
        }
    }

    /// The configured clock windows.
    pub fn windows(&self) -> &UnlockWindows {
        &self.windows
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The current entry for a marker, synthesizing the default
    /// (`reported`, no declaration) when the marker has never been seen.
    pub fn marker_view(&self, code: &MarkerCode) -> MarkerEntry {
        self.store
            .get(code)
            .unwrap_or_else(|| MarkerEntry::synthesized(code))
    }

    /// Temporarily unlock a marker.
    ///
    /// Creates the marker entry on first use, then writes a fresh
    /// `temporary` declaration with both deadlines derived from this
    /// call's instant, and mirrors the report status to `temporary`.
    /// Returns the new declaration snapshot.
    pub fn unlock_temp(&self, code: &MarkerCode, notes: Option<String>) -> Declaration {
        self.store.with_slot(code, |slot| {
            let now = Timestamp::now();
            let entry = slot.get_or_insert_with(|| MarkerEntry::synthesized(code));
            let declaration = Declaration::declare(now, &self.windows, notes);
            entry.declaration = Some(declaration.clone());
            entry.report.status = ReportStatus::Temporary;

            tracing::info!(
                marker = %code,
                eligible_final_at = %declaration.eligible_final_at,
                expires_at = %declaration.expires_at,
                "temporary unlock declared"
            );
            declaration
        })
    }

    /// Permanently unlock a marker.
    ///
    /// The precondition check and the transition run as one atomic
    /// sequence inside the store's critical section, with `now` read at
    /// commit time — client-side eligibility is advisory only. On success
    /// the coupon collaborator is invoked exactly once, after the lock is
    /// released.
    ///
    /// # Errors
    ///
    /// - [`UnlockError::NoDeclaration`] — the marker has no declaration.
    /// - [`UnlockError::TooEarly`] — `now` precedes `eligibleFinalAt`.
    /// - [`UnlockError::AlreadyFinalized`] — the cycle already completed.
    pub async fn unlock_final(
        &self,
        code: &MarkerCode,
        owner_email: Option<&str>,
    ) -> Result<FinalUnlockOutcome, UnlockError> {
        let finalized_at = self.store.with_slot(code, |slot| {
            let entry = slot.as_mut().ok_or_else(|| UnlockError::NoDeclaration {
                code: code.clone(),
            })?;
            let declaration =
                entry
                    .declaration
                    .as_mut()
                    .ok_or_else(|| UnlockError::NoDeclaration {
                        code: code.clone(),
                    })?;

            if declaration.status == DeclarationStatus::Finalized {
                return Err(UnlockError::AlreadyFinalized {
                    code: code.clone(),
                    finalized_at: declaration.finalized_at,
                });
            }

            let now = Timestamp::now();
            if !policy::is_final_eligible(declaration, now) {
                return Err(UnlockError::TooEarly {
                    code: code.clone(),
                    eligible_final_at: declaration.eligible_final_at,
                    now,
                });
            }

            declaration.status = DeclarationStatus::Finalized;
            declaration.finalized_at = Some(now);
            entry.report.status = ReportStatus::Resolved;
            Ok(now)
        })?;

        tracing::info!(marker = %code, finalized_at = %finalized_at, "final unlock committed");

        // The transition is authoritative; a degraded coupon service only
        // costs the owner a coupon.
        let coupon = match self.issuer.issue_for_final_unlock(code, owner_email).await {
            Ok(coupon) => coupon,
            Err(e) => {
                tracing::warn!(marker = %code, error = %e, "coupon issuance failed; finalization stands");
                None
            }
        };

        Ok(FinalUnlockOutcome {
            finalized_at,
            report_status: ReportStatus::Resolved,
            coupon,
        })
    }

    /// Test-support hook: rewrite the current declaration's eligibility
    /// instant to the Unix epoch so finalization is immediately permitted.
    ///
    /// This is the only path that may touch `eligibleFinalAt` after
    /// creation. The HTTP layer exposes it only when test hooks are
    /// enabled.
    pub fn set_eligible_past(&self, code: &MarkerCode) -> Result<Declaration, UnlockError> {
        self.store.with_slot(code, |slot| {
            let entry = slot.as_mut().ok_or_else(|| UnlockError::NoDeclaration {
                code: code.clone(),
            })?;
            let declaration =
                entry
                    .declaration
                    .as_mut()
                    .ok_or_else(|| UnlockError::NoDeclaration {
                        code: code.clone(),
                    })?;

            declaration.eligible_final_at = Timestamp::unix_epoch();
            Ok(declaration.clone())
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMarkerStore;
    use async_trait::async_trait;
    use curb_coupon::{CouponError, MemoryCouponIssuer};

    /// Coupon collaborator that always fails, for degradation tests.
    struct BrokenIssuer;

    #[async_trait]
    impl CouponIssuer for BrokenIssuer {
        async fn issue_for_final_unlock(
            &self,
            _marker: &MarkerCode,
            _owner_email: Option<&str>,
        ) -> Result<Option<CouponInfo>, CouponError> {
            Err(CouponError::Unavailable("connection refused".to_string()))
        }

        async fn coupons_for_marker(
            &self,
            _marker: &MarkerCode,
        ) -> Result<Vec<CouponInfo>, CouponError> {
            Err(CouponError::Unavailable("connection refused".to_string()))
        }

        async fn redeem(&self, id: uuid::Uuid) -> Result<(), CouponError> {
            Err(CouponError::NotFound(id))
        }
    }

    fn code(s: &str) -> MarkerCode {
        MarkerCode::new(s).unwrap()
    }

    fn machine() -> (UnlockMachine<MemoryMarkerStore>, MemoryCouponIssuer) {
        let issuer = MemoryCouponIssuer::with_default_catalog();
        let machine = UnlockMachine::new(
            MemoryMarkerStore::new(),
            Arc::new(issuer.clone()),
            UnlockWindows::default(),
        );
        (machine, issuer)
    }

    #[test]
    fn test_marker_view_synthesizes_default() {
        let (m, _) = machine();
        let view = m.marker_view(&code("ABC123"));
        assert_eq!(view.report.status, ReportStatus::Reported);
        assert!(view.declaration.is_none());
        // Viewing does not create the entry.
        assert!(m.store().is_empty());
    }

    #[test]
    fn test_unlock_temp_creates_declaration_with_derived_deadlines() {
        let (m, _) = machine();
        let c = code("ABC123");
        let d = m.unlock_temp(&c, Some("by the east exit".to_string()));

        assert_eq!(d.status, DeclarationStatus::Temporary);
        assert_eq!(d.declared_at.seconds_until(d.eligible_final_at), 900);
        assert_eq!(d.declared_at.seconds_until(d.expires_at), 86_400);
        assert_eq!(d.notes.as_deref(), Some("by the east exit"));

        let view = m.marker_view(&c);
        assert_eq!(view.report.status, ReportStatus::Temporary);
        assert_eq!(view.declaration, Some(d));
    }

    #[test]
    fn test_repeated_unlock_temp_resets_clocks() {
        let (m, _) = machine();
        let c = code("ABC123");
        m.unlock_temp(&c, None);

        // Force the eligibility instant into the past, then declare again:
        // the fresh declaration must derive its deadline from the new call
        // instant, not inherit the override.
        m.set_eligible_past(&c).unwrap();
        let second = m.unlock_temp(&c, None);

        assert_eq!(second.declared_at.seconds_until(second.eligible_final_at), 900);
        assert!(second.eligible_final_at > Timestamp::unix_epoch());
        assert!(second.finalized_at.is_none());
    }

    #[tokio::test]
    async fn test_unlock_final_without_declaration_fails() {
        let (m, _) = machine();
        let result = m.unlock_final(&code("ABC123"), None).await;
        assert!(matches!(result, Err(UnlockError::NoDeclaration { .. })));
    }

    #[tokio::test]
    async fn test_unlock_final_too_early_leaves_state_unchanged() {
        let (m, issuer) = machine();
        let c = code("ABC123");
        m.unlock_temp(&c, None);

        let err = m.unlock_final(&c, None).await.unwrap_err();
        match err {
            UnlockError::TooEarly {
                eligible_final_at,
                now,
                ..
            } => assert!(now < eligible_final_at),
            other => panic!("expected TooEarly, got: {other:?}"),
        }

        let view = m.marker_view(&c);
        assert_eq!(view.declaration.unwrap().status, DeclarationStatus::Temporary);
        assert_eq!(view.report.status, ReportStatus::Temporary);
        assert_eq!(issuer.issuance_count(), 0);
    }

    #[tokio::test]
    async fn test_unlock_final_succeeds_exactly_once() {
        let (m, issuer) = machine();
        let c = code("ABC123");
        m.unlock_temp(&c, None);
        m.set_eligible_past(&c).unwrap();

        let outcome = m.unlock_final(&c, Some("owner@example.com")).await.unwrap();
        assert_eq!(outcome.report_status, ReportStatus::Resolved);
        assert!(outcome.coupon.is_some());

        let view = m.marker_view(&c);
        let d = view.declaration.unwrap();
        assert_eq!(d.status, DeclarationStatus::Finalized);
        assert_eq!(d.finalized_at, Some(outcome.finalized_at));
        assert_eq!(view.report.status, ReportStatus::Resolved);

        // Second call fails deterministically, and no second coupon.
        let err = m.unlock_final(&c, None).await.unwrap_err();
        assert!(matches!(err, UnlockError::AlreadyFinalized { .. }));
        assert_eq!(issuer.issuance_count(), 1);
    }

    #[tokio::test]
    async fn test_unlock_temp_after_finalize_restarts_cycle() {
        let (m, _) = machine();
        let c = code("ABC123");
        m.unlock_temp(&c, None);
        m.set_eligible_past(&c).unwrap();
        m.unlock_final(&c, None).await.unwrap();

        let d = m.unlock_temp(&c, None);
        assert_eq!(d.status, DeclarationStatus::Temporary);
        assert!(d.finalized_at.is_none());
        assert_eq!(m.marker_view(&c).report.status, ReportStatus::Temporary);
    }

    #[tokio::test]
    async fn test_issuance_failure_does_not_roll_back_finalization() {
        let m = UnlockMachine::new(
            MemoryMarkerStore::new(),
            Arc::new(BrokenIssuer),
            UnlockWindows::default(),
        );
        let c = code("ABC123");
        m.unlock_temp(&c, None);
        m.set_eligible_past(&c).unwrap();

        let outcome = m.unlock_final(&c, None).await.unwrap();
        assert!(outcome.coupon.is_none());
        assert_eq!(
            m.marker_view(&c).declaration.unwrap().status,
            DeclarationStatus::Finalized
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_racing_final_unlocks_have_one_winner() {
        let issuer = MemoryCouponIssuer::with_default_catalog();
        let m = Arc::new(UnlockMachine::new(
            MemoryMarkerStore::new(),
            Arc::new(issuer.clone()) as Arc<dyn CouponIssuer>,
            UnlockWindows::default(),
        ));
        let c = code("ABC123");
        m.unlock_temp(&c, None);
        m.set_eligible_past(&c).unwrap();

        let (a, b) = {
            let (m1, c1) = (Arc::clone(&m), c.clone());
            let (m2, c2) = (Arc::clone(&m), c.clone());
            tokio::join!(
                tokio::spawn(async move { m1.unlock_final(&c1, None).await }),
                tokio::spawn(async move { m2.unlock_final(&c2, None).await }),
            )
        };
        let (a, b) = (a.unwrap(), b.unwrap());

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one racing call may win");

        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(
            loser.unwrap_err(),
            UnlockError::AlreadyFinalized { .. }
        ));
        assert_eq!(issuer.issuance_count(), 1);
    }

    #[test]
    fn test_set_eligible_past_requires_declaration() {
        let (m, _) = machine();
        assert!(matches!(
            m.set_eligible_past(&code("ABC123")),
            Err(UnlockError::NoDeclaration { .. })
        ));
    }
}

//! # Marker Lifecycle API
//!
//! The marker endpoints an owner's browser drives: current state, the
//! temporary unlock that starts the clocks, and the final unlock that
//! resolves the report and issues a coupon.
//!
//! The test-support route (`/markers/:code/test/set-eligible-past`) lives
//! in a separate router and is mounted only when test hooks are enabled.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use curb_core::MarkerCode;
use curb_coupon::CouponInfo;
use curb_state::{Declaration, Marker, MarkerEntry, Report, ReportStatus, MAX_NOTES_LEN};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Routes mounted unconditionally.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/markers/:code", get(get_marker))
        .route("/markers/:code/unlock-temp", post(unlock_temp))
        .route("/markers/:code/unlock-final", post(unlock_final))
}

/// Test-support routes. Mounted only when `AppConfig::test_hooks` is set;
/// an ordinary deployment 404s these paths.
pub fn test_hooks_router() -> Router<AppState> {
    Router::new().route(
        "/markers/:code/test/set-eligible-past",
        post(set_eligible_past),
    )
}

// ─── Request / Response Types ────────────────────────────────────────

/// Request body for a temporary unlock.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TempUnlockRequest {
    /// Optional free-text notes from the owner.
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for TempUnlockRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(notes) = &self.notes {
            if notes.chars().count() > MAX_NOTES_LEN {
                return Err(format!("notes must not exceed {MAX_NOTES_LEN} characters"));
            }
        }
        Ok(())
    }
}

/// Request body for a final unlock.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalUnlockRequest {
    /// Owner contact for the coupon issuance, if provided.
    #[serde(default)]
    pub owner_email: Option<String>,
}

impl Validate for FinalUnlockRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(email) = &self.owner_email {
            let email = email.trim();
            if email.is_empty() || email.len() > 254 || !email.contains('@') {
                return Err("ownerEmail must be a plausible e-mail address".to_string());
            }
        }
        Ok(())
    }
}

/// Response for `GET /markers/:code`: the marker, its report, and the
/// current declaration (null when none exists).
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkerResponse {
    /// The addressed marker.
    #[schema(value_type = Object)]
    pub marker: Marker,
    /// The associated report (synthesized as `reported` when absent).
    #[schema(value_type = Object)]
    pub report: Report,
    /// The current declaration, if any.
    #[schema(value_type = Option<Object>)]
    pub declaration: Option<Declaration>,
}

impl From<MarkerEntry> for MarkerResponse {
    fn from(entry: MarkerEntry) -> Self {
        Self {
            marker: entry.marker,
            report: entry.report,
            declaration: entry.declaration,
        }
    }
}

/// Response for a successful final unlock.
///
/// `coupon` is always present on the wire — explicitly `null` when no
/// template was available or issuance degraded.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalUnlockResponse {
    /// When the transition committed.
    #[schema(value_type = String)]
    pub finalized_at: curb_core::Timestamp,
    /// Report status after the transition (always `resolved`).
    #[schema(value_type = String)]
    pub status: ReportStatus,
    /// The issued coupon, or null.
    pub coupon: Option<CouponInfo>,
}

// ─── Handlers ────────────────────────────────────────────────────────

/// GET /markers/:code — Current marker state.
///
/// Synthesizes a default `reported` entry with no declaration when the
/// marker has never been declared; an unknown code is not an error.
#[utoipa::path(
    get,
    path = "/markers/{code}",
    params(("code" = String, Path, description = "Marker code")),
    responses(
        (status = 200, description = "Current marker state", body = MarkerResponse),
        (status = 422, description = "Invalid marker code", body = crate::error::ErrorBody),
    ),
    tag = "markers"
)]
async fn get_marker(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<MarkerResponse>, AppError> {
    let code = MarkerCode::new(code)?;
    Ok(Json(state.machine.marker_view(&code).into()))
}

/// POST /markers/:code/unlock-temp — Temporarily unlock a marker.
///
/// Always succeeds: creates or replaces the declaration and restarts both
/// clocks from this call's instant.
#[utoipa::path(
    post,
    path = "/markers/{code}/unlock-temp",
    params(("code" = String, Path, description = "Marker code")),
    request_body = TempUnlockRequest,
    responses(
        (status = 200, description = "Fresh temporary declaration", body = Object),
        (status = 422, description = "Invalid marker code or notes", body = crate::error::ErrorBody),
    ),
    tag = "markers"
)]
async fn unlock_temp(
    State(state): State<AppState>,
    Path(code): Path<String>,
    body: Result<Json<TempUnlockRequest>, JsonRejection>,
) -> Result<Json<Declaration>, AppError> {
    let code = MarkerCode::new(code)?;
    let req = extract_validated_json(body)?;
    Ok(Json(state.machine.unlock_temp(&code, req.notes)))
}

/// POST /markers/:code/unlock-final — Permanently unlock a marker.
///
/// Preconditions are re-checked server-side at the instant of this call;
/// client-side countdowns are advisory only.
#[utoipa::path(
    post,
    path = "/markers/{code}/unlock-final",
    params(("code" = String, Path, description = "Marker code")),
    request_body = FinalUnlockRequest,
    responses(
        (status = 200, description = "Finalized; coupon attached when available", body = FinalUnlockResponse),
        (status = 400, description = "No declaration, or eligibility not reached", body = crate::error::ErrorBody),
        (status = 409, description = "Already finalized", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid marker code or body", body = crate::error::ErrorBody),
    ),
    tag = "markers"
)]
async fn unlock_final(
    State(state): State<AppState>,
    Path(code): Path<String>,
    body: Result<Json<FinalUnlockRequest>, JsonRejection>,
) -> Result<Json<FinalUnlockResponse>, AppError> {
    let code = MarkerCode::new(code)?;
    let req = extract_validated_json(body)?;

    let outcome = state
        .machine
        .unlock_final(&code, req.owner_email.as_deref())
        .await?;

    Ok(Json(FinalUnlockResponse {
        finalized_at: outcome.finalized_at,
        status: outcome.report_status,
        coupon: outcome.coupon,
    }))
}

/// POST /markers/:code/test/set-eligible-past — Force eligibility.
///
/// Rewrites the current declaration's eligibility instant to the epoch so
/// a test can finalize without waiting out the window.
#[utoipa::path(
    post,
    path = "/markers/{code}/test/set-eligible-past",
    params(("code" = String, Path, description = "Marker code")),
    responses(
        (status = 200, description = "Updated declaration", body = Object),
        (status = 400, description = "No declaration", body = crate::error::ErrorBody),
    ),
    tag = "test-support"
)]
async fn set_eligible_past(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Declaration>, AppError> {
    let code = MarkerCode::new(code)?;
    Ok(Json(state.machine.set_eligible_past(&code)?))
}

// ─── Tests ───────────────────────────────────────────────────────────

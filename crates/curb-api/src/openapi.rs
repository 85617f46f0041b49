//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Curb API — Marker Unlock Service",
        version = "0.1.0",
        description = "Abandoned-bicycle marker unlock workflow.\n\nProvides:\n- **Marker state** with a synthesized default report for unseen codes\n- **Temporary unlock** starting the eligibility and auto-expiry clocks\n- **Final unlock** gated by the eligibility window, issuing a shop coupon\n- **Coupon listing and redemption**\n\nHealth probes (`/health/*`) are unauthenticated. The test-support route under `/markers/{code}/test/` exists only when `CURB_TEST_HOOKS=true`.",
        license(name = "AGPL-3.0-or-later")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::markers::get_marker,
        crate::routes::markers::unlock_temp,
        crate::routes::markers::unlock_final,
        crate::routes::coupons::marker_coupons,
        crate::routes::coupons::redeem_coupon,
    ),
    components(schemas(
        crate::routes::markers::TempUnlockRequest,
        crate::routes::markers::FinalUnlockRequest,
        crate::routes::markers::MarkerResponse,
        crate::routes::markers::FinalUnlockResponse,
        crate::routes::coupons::MarkerCouponsResponse,
        crate::routes::coupons::RedeemResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        curb_coupon::CouponInfo,
        curb_coupon::DiscountType,
    )),
    tags(
        (name = "markers", description = "Marker declaration lifecycle"),
        (name = "coupons", description = "Coupon listing and redemption"),
        (name = "test-support", description = "Test-only eligibility override"),
    )
)]
pub struct ApiDoc;

/// Router serving the generated document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

/// GET /openapi.json — the generated OpenAPI document.
async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

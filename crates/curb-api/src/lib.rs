//! # curb-api — Axum API Service for Curb Stack
//!
//! The HTTP surface of the marker-unlock workflow, built on
//! Axum/Tower/Tokio.
//!
//! ## API Surface
//!
//! | Prefix                         | Module               | Domain            |
//! |--------------------------------|----------------------|-------------------|
//! | `/markers/:code`               | [`routes::markers`]  | Marker state      |
//! | `/markers/:code/unlock-temp`   | [`routes::markers`]  | Temporary unlock  |
//! | `/markers/:code/unlock-final`  | [`routes::markers`]  | Final unlock      |
//! | `/markers/:code/test/*`        | [`routes::markers`]  | Test support      |
//! | `/markers/:code/coupons`       | [`routes::coupons`]  | Coupon listing    |
//! | `/coupons/:id/use`             | [`routes::coupons`]  | Coupon redemption |
//! | `/openapi.json`                | [`openapi`]          | API document      |
//! | `/health/*`                    | here                 | Probes            |
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers — delegates to curb-state and
//!   curb-coupon.
//! - All errors map to structured HTTP responses via [`AppError`].

pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::{AppConfig, AppState};

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the traced API stack so
/// probe traffic stays out of request logs. The test-support router is
/// mounted only when configured — an ordinary deployment has no test
/// routes at all, not merely disabled ones.
///
/// Body size limit: 64 KiB. The largest legitimate body is a notes field,
/// so anything bigger is noise or abuse.
pub fn app(state: AppState) -> Router {
    let mut api = Router::new()
        .merge(routes::markers::router())
        .merge(routes::coupons::router())
        .merge(openapi::router());

    if state.config.test_hooks {
        tracing::warn!("test hooks enabled — mounting /markers/:code/test/* routes");
        api = api.merge(routes::markers::test_hooks_router());
    }

    let api = api
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .with_state(state);

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application is ready to serve traffic.
///
/// Checks that the declaration store is readable (its lock is not wedged
/// by a writer that never returned).
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let _ = state.machine.store().len();
    (StatusCode::OK, "ready").into_response()
}

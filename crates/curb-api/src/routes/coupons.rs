//! # Coupon API
//!
//! Coupon listing per marker and redemption of an issued coupon. Thin
//! pass-through to the coupon collaborator; the issuance itself happens
//! inside the final-unlock flow.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use curb_core::MarkerCode;
use curb_coupon::{CouponInfo, CouponIssuer};

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/markers/:code/coupons", get(marker_coupons))
        .route("/coupons/:id/use", post(redeem_coupon))
}

/// Response for `GET /markers/:code/coupons`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkerCouponsResponse {
    /// The addressed marker code.
    #[schema(value_type = String)]
    pub code: MarkerCode,
    /// Coupons issued against the marker, newest first.
    pub coupons: Vec<CouponInfo>,
}

/// Response for a successful redemption.
#[derive(Debug, Serialize, ToSchema)]
pub struct RedeemResponse {
    pub success: bool,
}

/// GET /markers/:code/coupons — Coupons issued against a marker.
#[utoipa::path(
    get,
    path = "/markers/{code}/coupons",
    params(("code" = String, Path, description = "Marker code")),
    responses(
        (status = 200, description = "Coupons for the marker", body = MarkerCouponsResponse),
        (status = 422, description = "Invalid marker code", body = crate::error::ErrorBody),
    ),
    tag = "coupons"
)]
async fn marker_coupons(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<MarkerCouponsResponse>, AppError> {
    let code = MarkerCode::new(code)?;
    let coupons = state.issuer.coupons_for_marker(&code).await?;
    Ok(Json(MarkerCouponsResponse { code, coupons }))
}

/// POST /coupons/:id/use — Redeem an issued coupon.
#[utoipa::path(
    post,
    path = "/coupons/{id}/use",
    params(("id" = Uuid, Path, description = "Coupon issuance ID")),
    responses(
        (status = 200, description = "Coupon redeemed", body = RedeemResponse),
        (status = 404, description = "Unknown issuance", body = crate::error::ErrorBody),
        (status = 409, description = "Already used or expired", body = crate::error::ErrorBody),
    ),
    tag = "coupons"
)]
async fn redeem_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RedeemResponse>, AppError> {
    state.issuer.redeem(id).await?;
    Ok(Json(RedeemResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app() -> (Router<()>, AppState) {
        let state = AppState::new(AppConfig::default());
        (router().with_state(state.clone()), state)
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn handler_no_coupons_returns_empty_list() {
        let (app, _) = test_app();
        let req = Request::builder()
            .method("GET")
            .uri("/markers/ABC123/coupons")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["code"], "ABC123");
        assert_eq!(json["coupons"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn handler_lists_issued_coupon_and_redeems_it() {
        let (app, state) = test_app();
        let code = MarkerCode::new("ABC123").unwrap();
        let issued = state
            .issuer
            .issue_for_final_unlock(&code, None)
            .await
            .unwrap()
            .expect("seeded catalog issues");

        let req = Request::builder()
            .method("GET")
            .uri("/markers/ABC123/coupons")
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["coupons"][0]["id"], issued.id.to_string());
        assert!(json["coupons"][0]["shopName"].is_string());

        let use_req = Request::builder()
            .method("POST")
            .uri(format!("/coupons/{}/use", issued.id))
            .body(Body::empty())
            .unwrap();
        let use_resp = app.clone().oneshot(use_req).await.unwrap();
        assert_eq!(use_resp.status(), StatusCode::OK);
        assert_eq!(body_json(use_resp).await["success"], true);

        // A second redemption conflicts.
        let again = Request::builder()
            .method("POST")
            .uri(format!("/coupons/{}/use", issued.id))
            .body(Body::empty())
            .unwrap();
        let again_resp = app.oneshot(again).await.unwrap();
        assert_eq!(again_resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn handler_redeem_unknown_issuance_returns_404() {
        let (app, _) = test_app();
        let req = Request::builder()
            .method("POST")
            .uri(format!("/coupons/{}/use", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

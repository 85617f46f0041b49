//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from curb-state, curb-core, and curb-coupon to HTTP
//! status codes with stable machine-readable error codes. Never exposes
//! internal error details in responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use curb_core::{MarkerCode, Timestamp};
use curb_coupon::CouponError;
use curb_state::UnlockError;

/// Structured JSON error response body.
///
/// All error responses use this format. `details` carries additional
/// context for client errors (e.g. the eligibility instant on a too-early
/// final unlock) and is omitted for 500-class errors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NO_DECLARATION", "TOO_EARLY").
    pub code: String,
    /// Human-readable error message. Localization happens client-side;
    /// this text is for operators and logs.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// The marker has no current declaration (400).
    #[error("marker {0} has no declaration")]
    NoDeclaration(MarkerCode),

    /// Final unlock attempted before the eligibility instant (400).
    /// Carries the deadline (and the server clock reading) for client
    /// countdown display.
    #[error("final unlock not permitted until {eligible_final_at}")]
    TooEarly {
        eligible_final_at: Timestamp,
        now: Timestamp,
    },

    /// Final unlock attempted on an already-finalized declaration (409).
    #[error("marker {0} is already finalized")]
    AlreadyFinalized(MarkerCode),

    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (422). Normalized with
    /// `Validation`: the client sent syntactically valid HTTP but
    /// semantically invalid content.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),

    /// A dependency is not available (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NoDeclaration(_) => (StatusCode::BAD_REQUEST, "NO_DECLARATION"),
            Self::TooEarly { .. } => (StatusCode::BAD_REQUEST, "TOO_EARLY"),
            Self::AlreadyFinalized(_) => (StatusCode::CONFLICT, "ALREADY_FINALIZED"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }

    /// Client-facing details payload, when the error carries one.
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::TooEarly {
                eligible_final_at,
                now,
            } => Some(serde_json::json!({
                "eligibleFinalAt": eligible_final_at,
                "currentTime": now,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        // Log server-side errors for operator visibility.
        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convert curb-core validation errors to API errors.
impl From<curb_core::ValidationError> for AppError {
    fn from(err: curb_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Convert unlock state machine errors to API errors.
impl From<UnlockError> for AppError {
    fn from(err: UnlockError) -> Self {
        match err {
            UnlockError::NoDeclaration { code } => Self::NoDeclaration(code),
            UnlockError::TooEarly {
                eligible_final_at,
                now,
                ..
            } => Self::TooEarly {
                eligible_final_at,
                now,
            },
            UnlockError::AlreadyFinalized { code, .. } => Self::AlreadyFinalized(code),
        }
    }
}

/// Convert coupon collaborator errors to API errors.
impl From<CouponError> for AppError {
    fn from(err: CouponError) -> Self {
        match &err {
            CouponError::NotFound(_) => Self::NotFound(err.to_string()),
            CouponError::NotActive(_) | CouponError::Expired(_) => Self::Conflict(err.to_string()),
            CouponError::Unavailable(_) => Self::ServiceUnavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn code(s: &str) -> MarkerCode {
        MarkerCode::new(s).unwrap()
    }

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn no_declaration_status_code() {
        let err = AppError::NoDeclaration(code("ABC123"));
        let (status, c) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(c, "NO_DECLARATION");
    }

    #[test]
    fn too_early_status_code_and_details() {
        let err = AppError::TooEarly {
            eligible_final_at: ts("2026-08-05T12:15:00Z"),
            now: ts("2026-08-05T12:08:20Z"),
        };
        let (status, c) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(c, "TOO_EARLY");

        let details = err.details().unwrap();
        assert_eq!(details["eligibleFinalAt"], "2026-08-05T12:15:00Z");
        assert_eq!(details["currentTime"], "2026-08-05T12:08:20Z");
    }

    #[test]
    fn already_finalized_status_code() {
        let err = AppError::AlreadyFinalized(code("ABC123"));
        let (status, c) = err.status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(c, "ALREADY_FINALIZED");
    }

    #[test]
    fn validation_status_code() {
        let err = AppError::Validation("bad field".to_string());
        let (status, c) = err.status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(c, "VALIDATION_ERROR");
    }

    #[test]
    fn not_found_status_code() {
        let err = AppError::NotFound("missing".to_string());
        let (status, c) = err.status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(c, "NOT_FOUND");
    }

    #[test]
    fn unlock_error_conversions() {
        let err = AppError::from(UnlockError::NoDeclaration {
            code: code("ABC123"),
        });
        assert!(matches!(err, AppError::NoDeclaration(_)));

        let err = AppError::from(UnlockError::TooEarly {
            code: code("ABC123"),
            eligible_final_at: ts("2026-08-05T12:15:00Z"),
            now: ts("2026-08-05T12:00:00Z"),
        });
        assert!(matches!(err, AppError::TooEarly { .. }));

        let err = AppError::from(UnlockError::AlreadyFinalized {
            code: code("ABC123"),
            finalized_at: Some(ts("2026-08-05T12:20:00Z")),
        });
        assert!(matches!(err, AppError::AlreadyFinalized(_)));
    }

    #[test]
    fn coupon_error_conversions() {
        let id = Uuid::new_v4();
        assert!(matches!(
            AppError::from(CouponError::NotFound(id)),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(CouponError::NotActive(id)),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(CouponError::Expired(id)),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(CouponError::Unavailable("down".to_string())),
            AppError::ServiceUnavailable(_)
        ));
    }

    // ── into_response tests ──────────────────────────────────────

    use http_body_util::BodyExt;

    /// Helper to extract status and body from a Response.
    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn into_response_no_declaration() {
        let (status, body) = response_parts(AppError::NoDeclaration(code("ABC123"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, "NO_DECLARATION");
        assert!(body.error.message.contains("ABC123"));
        assert!(body.error.details.is_none());
    }

    #[tokio::test]
    async fn into_response_too_early_includes_deadline() {
        let err = AppError::TooEarly {
            eligible_final_at: ts("2026-08-05T12:15:00Z"),
            now: ts("2026-08-05T12:08:20Z"),
        };
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, "TOO_EARLY");
        let details = body.error.details.unwrap();
        assert_eq!(details["eligibleFinalAt"], "2026-08-05T12:15:00Z");
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) =
            response_parts(AppError::Internal("store lock panicked".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert!(
            !body.error.message.contains("store lock"),
            "internal error details must not leak: {}",
            body.error.message
        );
        assert_eq!(body.error.message, "An internal error occurred");
    }
}

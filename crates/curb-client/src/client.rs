//! # Typed Curb API Client
//!
//! One method per endpoint, deserializing into the shared wire types.
//! Non-2xx responses are parsed into [`ClientError::Api`] with the
//! machine-readable error code preserved, so callers can branch on
//! `TOO_EARLY` without string matching.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use curb_core::{MarkerCode, Timestamp};
use curb_coupon::CouponInfo;
use curb_state::{Declaration, MarkerEntry, ReportStatus};

use crate::error::ClientError;

/// Default request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Curb API (e.g. `http://localhost:8080`).
    pub base_url: Url,
}

impl ClientConfig {
    /// Parse a base URL string into a configuration.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL {base_url:?}: {e}")))?;
        Ok(Self { base_url })
    }
}

/// Result of a successful final unlock.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalUnlockResult {
    /// When the transition committed.
    pub finalized_at: Timestamp,
    /// Report status after the transition (always `resolved`).
    pub status: ReportStatus,
    /// The issued coupon, or `None`.
    pub coupon: Option<CouponInfo>,
}

/// Coupons issued against a marker.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkerCoupons {
    /// The addressed marker code.
    pub code: MarkerCode,
    /// Coupons, newest first.
    pub coupons: Vec<CouponInfo>,
}

/// Wire shape of a structured API error body.
#[derive(Debug, Deserialize)]
struct WireErrorBody {
    error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    code: String,
    message: String,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

/// Typed client for the Curb API.
#[derive(Debug, Clone)]
pub struct MarkerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl MarkerClient {
    /// Create a client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// GET /markers/:code — current marker state.
    pub async fn marker(&self, code: &MarkerCode) -> Result<MarkerEntry, ClientError> {
        let endpoint = format!("markers/{code}");
        let resp = self
            .http
            .get(self.join(&endpoint)?)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;
        Self::decode(endpoint, resp).await
    }

    /// POST /markers/:code/unlock-temp — temporarily unlock.
    pub async fn unlock_temp(
        &self,
        code: &MarkerCode,
        notes: Option<&str>,
    ) -> Result<Declaration, ClientError> {
        let endpoint = format!("markers/{code}/unlock-temp");
        let resp = self
            .http
            .post(self.join(&endpoint)?)
            .json(&serde_json::json!({ "notes": notes }))
            .send()
            .await
            .map_err(|source| ClientError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;
        Self::decode(endpoint, resp).await
    }

    /// POST /markers/:code/unlock-final — permanently unlock.
    ///
    /// The server re-checks eligibility at the instant of this call; a
    /// `TOO_EARLY` error carries the eligibility instant in
    /// [`ClientError::Api::eligible_final_at`].
    pub async fn unlock_final(
        &self,
        code: &MarkerCode,
        owner_email: Option<&str>,
    ) -> Result<FinalUnlockResult, ClientError> {
        let endpoint = format!("markers/{code}/unlock-final");
        let resp = self
            .http
            .post(self.join(&endpoint)?)
            .json(&serde_json::json!({ "ownerEmail": owner_email }))
            .send()
            .await
            .map_err(|source| ClientError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;
        Self::decode(endpoint, resp).await
    }

    /// GET /markers/:code/coupons — coupons issued against a marker.
    pub async fn coupons(&self, code: &MarkerCode) -> Result<MarkerCoupons, ClientError> {
        let endpoint = format!("markers/{code}/coupons");
        let resp = self
            .http
            .get(self.join(&endpoint)?)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;
        Self::decode(endpoint, resp).await
    }

    fn join(&self, endpoint: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(endpoint)
            .map_err(|e| ClientError::Config(format!("invalid endpoint {endpoint:?}: {e}")))
    }

    /// Decode a 2xx body, or turn a structured error body into
    /// [`ClientError::Api`].
    async fn decode<T: serde::de::DeserializeOwned>(
        endpoint: String,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return resp
                .json()
                .await
                .map_err(|source| ClientError::Deserialization { endpoint, source });
        }

        let status = status.as_u16();
        match resp.json::<WireErrorBody>().await {
            Ok(body) => {
                let eligible_final_at = body
                    .error
                    .details
                    .as_ref()
                    .and_then(|d| d.get("eligibleFinalAt"))
                    .and_then(|v| v.as_str())
                    .and_then(|s| Timestamp::parse(s).ok());
                Err(ClientError::Api {
                    endpoint,
                    status,
                    code: body.error.code,
                    message: body.error.message,
                    eligible_final_at,
                })
            }
            Err(_) => Err(ClientError::Api {
                endpoint,
                status,
                code: "UNKNOWN".to_string(),
                message: format!("server returned status {status} with an unreadable body"),
                eligible_final_at: None,
            }),
        }
    }
}

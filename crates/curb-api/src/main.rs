//! # curb-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the marker-unlock service.
//! Binds to a configurable port (default 8080).

use std::sync::Arc;

use curb_api::state::{AppConfig, AppState};
use curb_coupon::{CouponIssuer, MemoryCouponIssuer};
use curb_state::MemoryMarkerStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment. Invalid window overrides are a
    // startup failure, not a silent fallback.
    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration failed: {e}");
        e
    })?;
    let port = config.port;

    tracing::info!(
        eligibility_delay_secs = config.windows.eligibility_delay_secs,
        auto_expire_secs = config.windows.auto_expire_secs,
        test_hooks = config.test_hooks,
        "configuration loaded"
    );

    // Construct collaborators once, up front, and inject them.
    let issuer: Arc<dyn CouponIssuer> = Arc::new(MemoryCouponIssuer::with_default_catalog());
    let state = AppState::with_parts(config, MemoryMarkerStore::new(), issuer);

    let app = curb_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Curb API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

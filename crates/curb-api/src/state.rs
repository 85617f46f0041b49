//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! Collaborators are constructed once at process start and injected here —
//! the coupon issuer in particular is never lazily created from the
//! environment at first use. A misconfigured deployment fails at startup,
//! not on the first final unlock.

use std::sync::Arc;

use curb_core::{UnlockWindows, ValidationError};
use curb_coupon::{CouponIssuer, MemoryCouponIssuer};
use curb_state::{MemoryMarkerStore, UnlockMachine};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Whether the `/markers/:code/test/*` support routes are mounted.
    /// Never enable outside test deployments.
    pub test_hooks: bool,
    /// The declaration clock windows.
    pub windows: UnlockWindows,
}

impl AppConfig {
    /// Build configuration from the environment.
    ///
    /// - `PORT` — listen port (default 8080; unparseable values fall back).
    /// - `CURB_TEST_HOOKS` — `"true"` mounts the test-support routes.
    /// - `CURB_ELIGIBILITY_DELAY_SECS` / `CURB_AUTO_EXPIRE_SECS` — window
    ///   overrides. Invalid values are a configuration error: the server
    ///   refuses to start rather than silently running with default clocks.
    pub fn from_env() -> Result<Self, ValidationError> {
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let test_hooks = std::env::var("CURB_TEST_HOOKS")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let defaults = UnlockWindows::default();
        let eligibility_delay_secs =
            env_secs("CURB_ELIGIBILITY_DELAY_SECS", defaults.eligibility_delay_secs)?;
        let auto_expire_secs = env_secs("CURB_AUTO_EXPIRE_SECS", defaults.auto_expire_secs)?;
        let windows = UnlockWindows::new(eligibility_delay_secs, auto_expire_secs)?;

        Ok(Self {
            port,
            test_hooks,
            windows,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            test_hooks: false,
            windows: UnlockWindows::default(),
        }
    }
}

/// Read a seconds value from the environment, falling back to `default`
/// when unset, erroring when set but unparseable.
fn env_secs(name: &'static str, default: i64) -> Result<i64, ValidationError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ValidationError::UnparseableDuration { name, raw }),
        Err(_) => Ok(default),
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly: the machine and issuer sit behind `Arc`, and the store
/// inside the machine shares its data across clones.
#[derive(Clone)]
pub struct AppState {
    /// The unlock state machine over the in-memory declaration store.
    pub machine: Arc<UnlockMachine<MemoryMarkerStore>>,
    /// The coupon collaborator, also reachable directly for the coupon
    /// listing/redemption endpoints.
    pub issuer: Arc<dyn CouponIssuer>,
    /// Application configuration.
    pub config: AppConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create application state with the default in-memory store and the
    /// seeded coupon catalog.
    pub fn new(config: AppConfig) -> Self {
        let issuer: Arc<dyn CouponIssuer> = Arc::new(MemoryCouponIssuer::with_default_catalog());
        Self::with_parts(config, MemoryMarkerStore::new(), issuer)
    }

    /// Create application state from explicit parts (dependency injection
    /// for tests and alternative deployments).
    pub fn with_parts(
        config: AppConfig,
        store: MemoryMarkerStore,
        issuer: Arc<dyn CouponIssuer>,
    ) -> Self {
        let machine = Arc::new(UnlockMachine::new(
            store,
            Arc::clone(&issuer),
            config.windows,
        ));
        Self {
            machine,
            issuer,
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

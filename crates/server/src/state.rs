//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::MarketConfig;
use crate::error::AppError;
use crate::services::admin_check::AdminCheck;
use crate::services::google::{GoogleOAuthClient, OAuthError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MarketConfig,
    pool: PgPool,
    google: Option<GoogleOAuthClient>,
    admin_check: AdminCheck,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The Google client is only built when Google credentials are configured.
    #[must_use]
    pub fn new(config: MarketConfig, pool: PgPool) -> Self {
        let google = config.google.as_ref().map(GoogleOAuthClient::new);
        let admin_check = AdminCheck::new(config.admin_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                google,
                admin_check,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the Google OAuth client.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::NotConfigured` when Google sign-in is disabled.
    pub fn google(&self) -> Result<&GoogleOAuthClient, AppError> {
        self.inner
            .google
            .as_ref()
            .ok_or(AppError::OAuth(OAuthError::NotConfigured))
    }

    /// Get the cached admin role checker.
    #[must_use]
    pub fn admin_check(&self) -> &AdminCheck {
        &self.inner.admin_check
    }
}

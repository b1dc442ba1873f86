//! Cookie sessions stored in `PostgreSQL`.
//!
//! The session only carries the signed-in [`CurrentUser`](crate::models::CurrentUser)
//! and the transient Google login state. Nothing else is kept server-side per
//! visitor, and a request without a cookie never touches the store.

use sqlx::PgPool;
use tower_sessions::cookie::{SameSite, time::Duration};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::MarketConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pm_session";

/// Idle time after which a session is dropped.
const SESSION_IDLE_DAYS: i64 = 7;

/// Build the session layer. The `tower_sessions.session` table comes from a migration.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &MarketConfig,
) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(PostgresStore::new(pool.clone()))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_IDLE_DAYS)))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

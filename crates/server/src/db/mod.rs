//! Database operations for `PostgreSQL`.
//!
//! ## Tables
//!
//! - `users`, `user_passwords`, `user_identities` - Accounts and sign-in methods
//! - `profiles` - Credit balance, tier and username per user
//! - `prompts` - The catalog
//! - `user_claimed_prompts` - One row per (user, prompt) claim
//! - `prompt_requests` - Requests for new prompts
//! - `user_roles` - Capability grants (`admin`)
//! - `tower_sessions.session` - Session storage
//!
//! Every repository method takes the acting user as an explicit argument.
//! Nothing reads identity from ambient connection state.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p prompt-market-cli -- migrate
//! ```

pub mod claims;
pub mod profiles;
pub mod prompts;
pub mod requests;
pub mod roles;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The query itself failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row violates a domain invariant.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The addressed row does not exist.
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A value does not fit its column.
    #[error("out of range: {0}")]
    OutOfRange(String),
}

impl RepositoryError {
    pub(crate) fn corrupt(what: &str, err: impl std::fmt::Display) -> Self {
        Self::DataCorruption(format!("invalid {what} in database: {err}"))
    }
}

/// Whether an error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

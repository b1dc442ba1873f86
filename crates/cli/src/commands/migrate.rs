//! Database migration command.
//!
//! ```bash
//! pm-cli migrate
//! ```
//!
//! Migrations live in `crates/server/migrations/` and are embedded at
//! compile time.

use super::{CliError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use prompt_market_server::db::{self, RepositoryError};
use prompt_market_server::services::auth::AuthError;

/// Errors from CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] prompt_market_core::EmailError),

    #[error("No user with email: {0}")]
    UserNotFound(String),

    #[error("User {0} does not exist yet; pass --password to create it")]
    PasswordRequired(String),

    #[error("An administrator already exists; use `admin grant` instead")]
    AdminExists,

    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} invalid prompt(s) in seed file")]
    InvalidSeed(usize),
}

/// Database URL from `MARKET_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();

    std::env::var("MARKET_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("MARKET_DATABASE_URL"))
}

async fn connect() -> Result<PgPool, CliError> {
    let url = database_url()?;
    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&url).await?)
}

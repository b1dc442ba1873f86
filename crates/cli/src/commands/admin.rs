//! Admin role management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create the first administrator (creates the account if needed)
//! pm-cli admin bootstrap -e admin@example.com -p 'a long password'
//!
//! # Grant the admin role to an existing user
//! pm-cli admin grant -e someone@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `MARKET_DATABASE_URL` - `PostgreSQL` connection string

use sqlx::PgPool;

use prompt_market_core::Email;
use prompt_market_server::db::profiles::ProfileRepository;
use prompt_market_server::db::roles::RoleRepository;
use prompt_market_server::db::users::UserRepository;
use prompt_market_server::models::User;
use prompt_market_server::services::auth::AuthService;

use super::{CliError, connect};

/// Make `email` the first administrator.
///
/// Creates the account when it does not exist yet, which requires
/// `password`. Refuses once any administrator exists, before creating
/// anything.
///
/// # Errors
///
/// Returns `CliError::AdminExists` if an administrator already exists.
pub async fn bootstrap(email: &str, password: Option<&str>) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let pool = connect().await?;

    let user = bootstrap_with_pool(&pool, &email, password).await?;

    tracing::info!("Administrator created: {} ({})", user.email, user.id);
    Ok(())
}

async fn bootstrap_with_pool(
    pool: &PgPool,
    email: &Email,
    password: Option<&str>,
) -> Result<User, CliError> {
    let roles = RoleRepository::new(pool);
    if roles.count_admins().await? > 0 {
        return Err(CliError::AdminExists);
    }

    let user = match UserRepository::new(pool).get_by_email(email).await? {
        Some(user) => {
            tracing::info!(user_id = %user.id, "Using existing account");
            user
        }
        None => {
            let password = password.ok_or_else(|| CliError::PasswordRequired(email.to_string()))?;
            let user = AuthService::new(pool)
                .sign_up(email.as_str(), password)
                .await?;
            tracing::info!(user_id = %user.id, "Account created");
            user
        }
    };

    ProfileRepository::new(pool)
        .get_or_create(user.id, &user.email)
        .await?;

    // A concurrent bootstrap can still win between the check and here
    if !roles.bootstrap_admin(user.id).await? {
        return Err(CliError::AdminExists);
    }

    Ok(user)
}

/// Grant the admin role to an existing user. Granting twice is a no-op.
///
/// # Errors
///
/// Returns `CliError::UserNotFound` if no account uses `email`.
pub async fn grant(email: &str) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CliError::UserNotFound(email.to_string()))?;

    if RoleRepository::new(&pool).grant_admin(user.id).await? {
        tracing::info!("Granted admin to {} ({})", user.email, user.id);
    } else {
        tracing::info!("{} is already an administrator", user.email);
    }

    tracing::info!(
        "Running servers may keep the old answer for up to MARKET_ADMIN_CACHE_TTL_SECS"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use prompt_market_core::UserId;

    async fn test_pool() -> PgPool {
        let url = std::env::var("TEST_DATABASE_URL")
            .expect("TEST_DATABASE_URL must be set for database tests");
        PgPool::connect(&url).await.expect("connect to TEST_DATABASE_URL")
    }

    fn fresh_email() -> Email {
        Email::parse(&format!("cli-{}@example.com", UserId::generate())).unwrap()
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
    async fn test_refused_bootstrap_creates_no_account() {
        let pool = test_pool().await;

        // Make sure some administrator exists
        let admin = AuthService::new(&pool)
            .sign_up(fresh_email().as_str(), "hunter22")
            .await
            .unwrap();
        RoleRepository::new(&pool).grant_admin(admin.id).await.unwrap();

        let email = fresh_email();
        let result = bootstrap_with_pool(&pool, &email, Some("hunter22")).await;
        assert!(matches!(result, Err(CliError::AdminExists)));

        let stray = UserRepository::new(&pool).get_by_email(&email).await.unwrap();
        assert!(stray.is_none());
    }
}

//! User repository for database operations.
//!
//! Accounts, password hashes and linked OAuth identities.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use prompt_market_core::{Email, UserId};

use super::{RepositoryError, is_unique_violation};
use crate::models::User;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| RepositoryError::corrupt("email", e))?;
        Ok(Self {
            id: row.id,
            email,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, created_at FROM users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Create a new user with email and password.
    ///
    /// The account row and the password row are written in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (email)
            VALUES ($1)
            RETURNING id, email, created_at
            ",
        )
        .bind(email.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        let user = User::try_from(row)?;

        sqlx::query("INSERT INTO user_passwords (user_id, password_hash) VALUES ($1, $2)")
            .bind(user.id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` when the email is unknown or the account has no
    /// password (OAuth-only).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(
            r"
            SELECT u.id, u.email, u.created_at, p.password_hash
            FROM users u
            JOIN user_passwords p ON p.user_id = u.id
            WHERE u.email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((User::try_from(r.user)?, r.password_hash)))
            .transpose()
    }

    /// Find the user linked to an external identity, creating or linking one.
    ///
    /// When the identity is new, the account with the same email is reused if
    /// it exists, otherwise a fresh account is created. Concurrent first
    /// logins converge on one account through the unique constraints.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn find_or_create_by_identity(
        &self,
        provider: &str,
        subject: &str,
        email: &Email,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let linked = sqlx::query_as::<_, UserRow>(
            r"
            SELECT u.id, u.email, u.created_at
            FROM user_identities i
            JOIN users u ON u.id = i.user_id
            WHERE i.provider = $1 AND i.subject = $2
            ",
        )
        .bind(provider)
        .bind(subject)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = linked {
            tx.commit().await?;
            return User::try_from(row);
        }

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (email)
            VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET updated_at = now()
            RETURNING id, email, created_at
            ",
        )
        .bind(email.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO user_identities (provider, subject, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (provider, subject) DO NOTHING
            ",
        )
        .bind(provider)
        .bind(subject)
        .bind(row.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        User::try_from(row)
    }
}

//! Profile repository.
//!
//! Profiles are created lazily: the first authenticated read inserts the row
//! with the defaults from [`prompt_market_core::profile`].

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use prompt_market_core::profile::{self, Profile};
use prompt_market_core::{Credits, Email, SubscriptionTier, UserId, Username};

use super::RepositoryError;

const PROFILE_COLUMNS: &str =
    "id, username, credit_balance, subscription_tier, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: UserId,
    username: String,
    credit_balance: i32,
    subscription_tier: SubscriptionTier,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let credit_balance = Credits::from_db(row.credit_balance)
            .map_err(|e| RepositoryError::corrupt("credit balance", e))?;
        Ok(Self {
            id: row.id,
            username: row.username,
            credit_balance,
            subscription_tier: row.subscription_tier,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insert the default profile for `user_id` unless one exists.
///
/// Runs on the caller's connection so it can join an open transaction.
pub(crate) async fn ensure_profile(
    conn: &mut PgConnection,
    user_id: UserId,
    email: &Email,
) -> Result<(), RepositoryError> {
    let balance = profile::DEFAULT_CREDIT_BALANCE
        .to_db()
        .map_err(|e| RepositoryError::corrupt("default balance", e))?;

    sqlx::query(
        r"
        INSERT INTO profiles (id, username, credit_balance, subscription_tier)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO NOTHING
        ",
    )
    .bind(user_id)
    .bind(profile::default_username(email))
    .bind(balance)
    .bind(profile::DEFAULT_TIER)
    .execute(conn)
    .await?;

    Ok(())
}

/// Lock the profile row for the rest of the transaction.
pub(crate) async fn lock_profile(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Profile, RepositoryError> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1 FOR UPDATE"
    ))
    .bind(user_id)
    .fetch_optional(conn)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Profile::try_from(row)
}

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the caller's profile, creating it with defaults on first access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn get_or_create(
        &self,
        user_id: UserId,
        email: &Email,
    ) -> Result<Profile, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        ensure_profile(&mut conn, user_id, email).await?;

        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        Profile::try_from(row)
    }

    /// Change the caller's username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    pub async fn update_username(
        &self,
        user_id: UserId,
        username: &Username,
    ) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r"
            UPDATE profiles SET username = $2, updated_at = now()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Profile::try_from(row)
    }

    /// All profiles, newest first. Administrators only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Profile>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Profile::try_from).collect()
    }

    /// Apply an administrator edit in one statement. `None` leaves a field as is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    pub async fn admin_update(
        &self,
        user_id: UserId,
        balance: Option<Credits>,
        tier: Option<SubscriptionTier>,
    ) -> Result<Profile, RepositoryError> {
        let balance = balance
            .map(Credits::to_db)
            .transpose()
            .map_err(|e| RepositoryError::OutOfRange(e.to_string()))?;

        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r"
            UPDATE profiles
            SET credit_balance = COALESCE($2, credit_balance),
                subscription_tier = COALESCE($3, subscription_tier),
                updated_at = now()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(balance)
        .bind(tier)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Profile::try_from(row)
    }
}

//! Role repository.
//!
//! A row in `user_roles` grants the role. There is no row for "ordinary user".

use sqlx::PgPool;

use prompt_market_core::{AppRole, UserId};

use super::RepositoryError;

/// Repository for role grants.
pub struct RoleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RoleRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether `user_id` holds the admin role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails. Callers decide
    /// what a failed read means; the server treats it as "not admin".
    pub async fn is_admin(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let is_admin = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM user_roles WHERE user_id = $1 AND role = $2)",
        )
        .bind(user_id)
        .bind(AppRole::Admin)
        .fetch_one(self.pool)
        .await?;

        Ok(is_admin)
    }

    /// Grant the admin role. Granting twice is a no-op.
    ///
    /// Returns `true` when a new grant was written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn grant_admin(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(AppRole::Admin)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Make `user_id` the first administrator.
    ///
    /// Succeeds only while no admin exists. The table lock conflicts with
    /// itself and with every insert, so of two concurrent bootstraps exactly
    /// one sees an empty table and writes its grant.
    ///
    /// Returns `true` when this call created the first admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn bootstrap_admin(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("LOCK TABLE user_roles IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let admin_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM user_roles WHERE role = $1)")
                .bind(AppRole::Admin)
                .fetch_one(&mut *tx)
                .await?;

        if admin_exists {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(user_id)
            .bind(AppRole::Admin)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Number of administrators.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_admins(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT count(*) FROM user_roles WHERE role = $1")
            .bind(AppRole::Admin)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

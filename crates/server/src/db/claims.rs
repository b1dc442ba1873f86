//! Claim repository: the atomic credit-claim transaction.
//!
//! [`ClaimRepository::claim`] runs as one `PostgreSQL` transaction:
//!
//! 1. Insert the caller's profile if it is missing.
//! 2. `SELECT ... FOR UPDATE` the profile row. Concurrent claims by the same
//!    user queue here, so each one sees the balance the previous one left.
//! 3. Read the prompt cost `FOR SHARE` so the prompt cannot be deleted
//!    underneath the claim.
//! 4. Check for an existing claim and run [`claim::evaluate`].
//! 5. Write the debit (if any) and the claim row, then commit.
//!
//! Any early return drops the transaction, which rolls it back. The
//! `UNIQUE (user_id, prompt_id)` and `CHECK (credit_balance >= 0)`
//! constraints hold the invariants even if this code were bypassed.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use prompt_market_core::claim::{self, ClaimError, ClaimInput};
use prompt_market_core::{ClaimId, Credits, Email, PromptId, UserId};

use super::profiles::{ensure_profile, lock_profile};
use super::prompts::PromptRow;
use super::{RepositoryError, is_unique_violation};
use crate::models::{ClaimReceipt, ClaimedPrompt};

fn failed(err: impl std::fmt::Display) -> ClaimError {
    ClaimError::TransactionFailed(err.to_string())
}

#[derive(sqlx::FromRow)]
struct ClaimedRow {
    claim_id: ClaimId,
    claimed_at: DateTime<Utc>,
    #[sqlx(flatten)]
    prompt: PromptRow,
}

/// Repository for claims.
pub struct ClaimRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ClaimRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Claim `prompt_id` for `user_id`.
    ///
    /// `email` seeds the profile if this is the user's first access.
    ///
    /// # Errors
    ///
    /// - `AlreadyClaimed` if the pair is already claimed, including when a
    ///   concurrent claim wins the unique constraint.
    /// - `InsufficientCredits` if a free-tier balance is below the cost.
    /// - `PromptNotFound` if the prompt does not exist.
    /// - `TransactionFailed` for any other database failure. Nothing was
    ///   committed in that case.
    pub async fn claim(
        &self,
        user_id: UserId,
        email: &Email,
        prompt_id: PromptId,
    ) -> Result<ClaimReceipt, ClaimError> {
        let mut tx = self.pool.begin().await.map_err(failed)?;

        ensure_profile(&mut tx, user_id, email)
            .await
            .map_err(failed)?;
        let profile = lock_profile(&mut tx, user_id).await.map_err(failed)?;

        let raw_cost: Option<i32> =
            sqlx::query_scalar("SELECT credit_cost FROM prompts WHERE id = $1 FOR SHARE")
                .bind(prompt_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(failed)?;
        let cost = Credits::from_db(raw_cost.ok_or(ClaimError::PromptNotFound)?).map_err(failed)?;

        let already_claimed: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM user_claimed_prompts
                WHERE user_id = $1 AND prompt_id = $2
            )
            ",
        )
        .bind(user_id)
        .bind(prompt_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(failed)?;

        let plan = claim::evaluate(&ClaimInput {
            tier: profile.subscription_tier,
            balance: profile.credit_balance,
            cost,
            already_claimed,
        })?;

        if plan.debits() {
            sqlx::query(
                "UPDATE profiles SET credit_balance = $2, updated_at = now() WHERE id = $1",
            )
            .bind(user_id)
            .bind(plan.balance_after.to_db().map_err(failed)?)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
        }

        let (claim_id, claimed_at): (ClaimId, DateTime<Utc>) = sqlx::query_as(
            r"
            INSERT INTO user_claimed_prompts (user_id, prompt_id)
            VALUES ($1, $2)
            RETURNING id, claimed_at
            ",
        )
        .bind(user_id)
        .bind(prompt_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ClaimError::AlreadyClaimed
            } else {
                failed(e)
            }
        })?;

        tx.commit().await.map_err(failed)?;

        Ok(ClaimReceipt {
            claim_id,
            prompt_id,
            charged: plan.charged,
            balance_after: plan.balance_after,
            claimed_at,
        })
    }

    /// Whether `user_id` has claimed `prompt_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_claimed(
        &self,
        user_id: UserId,
        prompt_id: PromptId,
    ) -> Result<bool, RepositoryError> {
        let claimed = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM user_claimed_prompts
                WHERE user_id = $1 AND prompt_id = $2
            )
            ",
        )
        .bind(user_id)
        .bind(prompt_id)
        .fetch_one(self.pool)
        .await?;

        Ok(claimed)
    }

    /// IDs of every prompt `user_id` has claimed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn claimed_ids(&self, user_id: UserId) -> Result<Vec<PromptId>, RepositoryError> {
        let ids = sqlx::query_scalar("SELECT prompt_id FROM user_claimed_prompts WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        Ok(ids)
    }

    /// The caller's claimed prompts with their text, most recent claim first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ClaimedPrompt>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClaimedRow>(
            r"
            SELECT c.id AS claim_id, c.claimed_at,
                   p.id, p.title, p.category, p.platform, p.credit_cost, p.is_premium,
                   p.usage_tips, p.example_image_url, p.created_at, p.prompt_text
            FROM user_claimed_prompts c
            JOIN prompts p ON p.id = c.prompt_id
            WHERE c.user_id = $1
            ORDER BY c.claimed_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(ClaimedPrompt {
                    claim_id: row.claim_id,
                    claimed_at: row.claimed_at,
                    prompt: row.prompt.try_into()?,
                })
            })
            .collect()
    }
}

//! Prompt request repository and the weekly throttle transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use prompt_market_core::requests::{self, RequestDetails, RequestError};
use prompt_market_core::{Email, PromptId, PromptRequestId, RequestStatus, UserId};

use super::RepositoryError;
use super::profiles::{ensure_profile, lock_profile};
use crate::models::PromptRequest;

const REQUEST_COLUMNS: &str =
    "id, user_id, request_details, status, completed_prompt_id, created_at";

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: PromptRequestId,
    user_id: UserId,
    request_details: String,
    status: RequestStatus,
    completed_prompt_id: Option<PromptId>,
    created_at: DateTime<Utc>,
}

impl From<RequestRow> for PromptRequest {
    fn from(row: RequestRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            request_details: row.request_details,
            status: row.status,
            completed_prompt_id: row.completed_prompt_id,
            created_at: row.created_at,
        }
    }
}

fn failed(err: impl std::fmt::Display) -> RequestError {
    RequestError::TransactionFailed(err.to_string())
}

/// Repository for prompt requests.
pub struct RequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RequestRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Submit a request, enforcing one `Pending` request per rolling week.
    ///
    /// The caller's profile row is locked first, so two submissions from the
    /// same user serialize and the second one sees the first.
    ///
    /// # Errors
    ///
    /// Returns `LimitReached` when a `Pending` request from the last seven
    /// days exists, `TransactionFailed` on database errors.
    pub async fn submit(
        &self,
        user_id: UserId,
        email: &Email,
        details: &RequestDetails,
        now: DateTime<Utc>,
    ) -> Result<PromptRequest, RequestError> {
        let mut tx = self.pool.begin().await.map_err(failed)?;

        ensure_profile(&mut tx, user_id, email)
            .await
            .map_err(failed)?;
        lock_profile(&mut tx, user_id).await.map_err(failed)?;

        let latest_pending: Option<DateTime<Utc>> = sqlx::query_scalar(
            r"
            SELECT max(created_at) FROM prompt_requests
            WHERE user_id = $1 AND status = 'Pending'
            ",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(failed)?;

        requests::check_window(latest_pending, now)?;

        let row = sqlx::query_as::<_, RequestRow>(&format!(
            r"
            INSERT INTO prompt_requests (user_id, request_details, created_at)
            VALUES ($1, $2, $3)
            RETURNING {REQUEST_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(details.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(failed)?;

        tx.commit().await.map_err(failed)?;

        Ok(row.into())
    }

    /// The caller's own requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PromptRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM prompt_requests WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Every request, newest first. Administrators only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<PromptRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM prompt_requests ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Move a request to `status`. Administrators only.
    ///
    /// `completed_prompt_id` is stored only with `Completed`; any other status
    /// clears the link.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no request has this ID.
    pub async fn update_status(
        &self,
        id: PromptRequestId,
        status: RequestStatus,
        completed_prompt_id: Option<PromptId>,
    ) -> Result<PromptRequest, RepositoryError> {
        let completed_prompt_id =
            completed_prompt_id.filter(|_| status == RequestStatus::Completed);

        let row = sqlx::query_as::<_, RequestRow>(&format!(
            r"
            UPDATE prompt_requests
            SET status = $2, completed_prompt_id = $3
            WHERE id = $1
            RETURNING {REQUEST_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .bind(completed_prompt_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }
}

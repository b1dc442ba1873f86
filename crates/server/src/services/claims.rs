//! Claim service: runs the claim transaction under a deadline.

use std::time::Duration;

use sqlx::PgPool;
use tracing::{info, instrument, warn};

use prompt_market_core::claim::ClaimError;
use prompt_market_core::{Email, PromptId, UserId};

use crate::db::claims::ClaimRepository;
use crate::models::ClaimReceipt;

/// Message carried by `TransactionFailed` when the deadline passes.
pub const TIMED_OUT: &str = "timed out; outcome unknown";

/// Claims prompts on behalf of signed-in users.
pub struct ClaimService<'a> {
    pool: &'a PgPool,
    timeout: Duration,
}

impl<'a> ClaimService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Claim `prompt_id` for `user_id`.
    ///
    /// # Errors
    ///
    /// Propagates [`ClaimError`] from the transaction. A claim that does not
    /// finish within the timeout is reported as `TransactionFailed`; the
    /// caller should re-read claim status before retrying.
    #[instrument(skip_all, fields(%user_id, %prompt_id))]
    pub async fn claim(
        &self,
        user_id: UserId,
        email: &Email,
        prompt_id: PromptId,
    ) -> Result<ClaimReceipt, ClaimError> {
        let result = with_deadline(
            self.timeout,
            ClaimRepository::new(self.pool).claim(user_id, email, prompt_id),
        )
        .await;

        match &result {
            Ok(receipt) => info!(
                charged = %receipt.charged,
                balance_after = %receipt.balance_after,
                "Prompt claimed"
            ),
            Err(ClaimError::TransactionFailed(reason)) => {
                warn!(%reason, "Claim transaction failed");
            }
            Err(e) => info!(code = e.code(), "Claim rejected"),
        }

        result
    }
}

async fn with_deadline<T>(
    timeout: Duration,
    claim: impl Future<Output = Result<T, ClaimError>>,
) -> Result<T, ClaimError> {
    tokio::time::timeout(timeout, claim)
        .await
        .unwrap_or_else(|_| Err(ClaimError::TransactionFailed(TIMED_OUT.to_string())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_passes_through_result() {
        let result = with_deadline(Duration::from_secs(1), async {
            Err::<(), _>(ClaimError::AlreadyClaimed)
        })
        .await;
        assert_eq!(result, Err(ClaimError::AlreadyClaimed));
    }

    #[tokio::test]
    async fn test_deadline_reports_unknown_outcome() {
        let result = with_deadline(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err, ClaimError::TransactionFailed(TIMED_OUT.to_string()));
    }
}

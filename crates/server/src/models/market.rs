//! Claim and request records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use prompt_market_core::catalog::Prompt;
use prompt_market_core::{ClaimId, Credits, PromptId, PromptRequestId, RequestStatus, UserId};

/// Result of a successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClaimReceipt {
    pub claim_id: ClaimId,
    pub prompt_id: PromptId,
    /// Credits debited; zero under the unlimited tier.
    pub charged: Credits,
    pub balance_after: Credits,
    pub claimed_at: DateTime<Utc>,
}

/// A prompt the user owns, with its text.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimedPrompt {
    pub claim_id: ClaimId,
    pub claimed_at: DateTime<Utc>,
    pub prompt: Prompt,
}

/// A user's request for a new prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptRequest {
    pub id: PromptRequestId,
    pub user_id: UserId,
    pub request_details: String,
    pub status: RequestStatus,
    pub completed_prompt_id: Option<PromptId>,
    pub created_at: DateTime<Utc>,
}

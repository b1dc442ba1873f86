//! The credit-claim decision.
//!
//! Claiming moves a (user, prompt) pair from unclaimed to claimed, debiting
//! the prompt's cost unless the user's tier waives it. The server evaluates
//! [`evaluate`] while holding a row lock on the caller's profile, inside the
//! same transaction that writes the debit and the claim row, so the decision
//! and the mutation are one atomic step.
//!
//! Branches, in order:
//!
//! 1. A claim already exists: [`ClaimError::AlreadyClaimed`]. Nothing is charged,
//!    so repeating a claim can never double-charge.
//! 2. Tier is `unlimited`: succeed with a zero charge.
//! 3. Balance below cost: [`ClaimError::InsufficientCredits`].
//! 4. Otherwise debit the cost.

use serde::Serialize;

use crate::types::{Credits, SubscriptionTier};

/// Everything the decision needs, read under lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimInput {
    pub tier: SubscriptionTier,
    pub balance: Credits,
    pub cost: Credits,
    pub already_claimed: bool,
}

/// What the transaction must write when the decision succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClaimPlan {
    /// Credits to debit. Zero under the unlimited tier.
    pub charged: Credits,
    /// Balance after the debit.
    pub balance_after: Credits,
}

impl ClaimPlan {
    /// Whether the profile row needs an update.
    #[must_use]
    pub const fn debits(&self) -> bool {
        self.charged.get() > 0
    }
}

/// Outcome of a failed claim.
///
/// `AlreadyClaimed`, `InsufficientCredits` and `PromptNotFound` are expected,
/// user-facing results; retrying without a change in state gives the same
/// answer. `TransactionFailed` means the outcome is unknown: callers should
/// re-read claim status before trying again.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("prompt already claimed")]
    AlreadyClaimed,

    #[error("insufficient credits: {required} required, {available} available")]
    InsufficientCredits {
        required: Credits,
        available: Credits,
    },

    #[error("prompt not found")]
    PromptNotFound,

    #[error("claim transaction failed: {0}")]
    TransactionFailed(String),
}

impl ClaimError {
    /// Stable machine-readable code for API clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AlreadyClaimed => "already_claimed",
            Self::InsufficientCredits { .. } => "insufficient_credits",
            Self::PromptNotFound => "prompt_not_found",
            Self::TransactionFailed(_) => "transaction_failed",
        }
    }

    /// Only opaque failures are safe to retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransactionFailed(_))
    }
}

/// Decide a claim.
///
/// # Errors
///
/// Returns `AlreadyClaimed` or `InsufficientCredits` per the branch order in
/// the module docs. Never returns `PromptNotFound` or `TransactionFailed`;
/// those come from the storage layer.
pub fn evaluate(input: &ClaimInput) -> Result<ClaimPlan, ClaimError> {
    if input.already_claimed {
        return Err(ClaimError::AlreadyClaimed);
    }

    if input.tier.bypasses_credits() {
        return Ok(ClaimPlan {
            charged: Credits::ZERO,
            balance_after: input.balance,
        });
    }

    match input.balance.checked_sub(input.cost) {
        Some(balance_after) => Ok(ClaimPlan {
            charged: input.cost,
            balance_after,
        }),
        None => Err(ClaimError::InsufficientCredits {
            required: input.cost,
            available: input.balance,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(tier: SubscriptionTier, balance: u32, cost: u32, claimed: bool) -> ClaimInput {
        ClaimInput {
            tier,
            balance: Credits::new(balance),
            cost: Credits::new(cost),
            already_claimed: claimed,
        }
    }

    #[test]
    fn test_free_tier_debits_cost() {
        let plan = evaluate(&input(SubscriptionTier::Free, 10, 3, false)).unwrap();
        assert_eq!(plan.charged, Credits::new(3));
        assert_eq!(plan.balance_after, Credits::new(7));
        assert!(plan.debits());
    }

    #[test]
    fn test_exact_balance_reaches_zero() {
        let plan = evaluate(&input(SubscriptionTier::Free, 3, 3, false)).unwrap();
        assert_eq!(plan.balance_after, Credits::ZERO);
    }

    #[test]
    fn test_insufficient_credits() {
        let err = evaluate(&input(SubscriptionTier::Free, 2, 5, false)).unwrap_err();
        assert_eq!(
            err,
            ClaimError::InsufficientCredits {
                required: Credits::new(5),
                available: Credits::new(2),
            }
        );
        assert_eq!(err.code(), "insufficient_credits");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_unlimited_tier_never_charges() {
        let plan = evaluate(&input(SubscriptionTier::Unlimited, 0, 5, false)).unwrap();
        assert_eq!(plan.charged, Credits::ZERO);
        assert_eq!(plan.balance_after, Credits::ZERO);
        assert!(!plan.debits());
    }

    #[test]
    fn test_already_claimed_wins_over_every_other_branch() {
        for tier in [SubscriptionTier::Free, SubscriptionTier::Unlimited] {
            for balance in [0, 100] {
                let err = evaluate(&input(tier, balance, 5, true)).unwrap_err();
                assert_eq!(err, ClaimError::AlreadyClaimed);
            }
        }
    }

    #[test]
    fn test_sequential_claims_charge_once() {
        let first = evaluate(&input(SubscriptionTier::Free, 10, 3, false)).unwrap();
        let second = evaluate(&input(SubscriptionTier::Free, first.balance_after.get(), 3, true));
        assert_eq!(first.balance_after, Credits::new(7));
        assert_eq!(second, Err(ClaimError::AlreadyClaimed));
    }

    #[test]
    fn test_only_transaction_failed_is_retryable() {
        assert!(ClaimError::TransactionFailed("timeout".into()).is_retryable());
        assert!(!ClaimError::AlreadyClaimed.is_retryable());
        assert!(!ClaimError::PromptNotFound.is_retryable());
    }
}

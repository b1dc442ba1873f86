//! Profile defaults and the user-visible profile shape.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{Credits, Email, SubscriptionTier, UserId};

/// Credits granted to every new profile.
pub const DEFAULT_CREDIT_BALANCE: Credits = Credits::new(10);

/// Tier assigned to every new profile.
pub const DEFAULT_TIER: SubscriptionTier = SubscriptionTier::Free;

/// Username used when an email has no usable local part.
pub const FALLBACK_USERNAME: &str = "user";

/// Per-user market state. Created lazily on first authenticated access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    pub credit_balance: Credits,
    pub subscription_tier: SubscriptionTier,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derive the initial username from an email address.
#[must_use]
pub fn default_username(email: &Email) -> String {
    let local = email.local_part().trim();
    if local.is_empty() {
        FALLBACK_USERNAME.to_owned()
    } else {
        local.to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_username_is_local_part() {
        let email = Email::parse("ada.lovelace@example.com").unwrap();
        assert_eq!(default_username(&email), "ada.lovelace");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(DEFAULT_CREDIT_BALANCE.get(), 10);
        assert_eq!(DEFAULT_TIER, SubscriptionTier::Free);
    }
}

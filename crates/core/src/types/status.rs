//! Status and role enums.
//!
//! Each enum has a matching `PostgreSQL` enum type created by the server
//! migrations. The string forms are the wire format of the JSON API as well.

use serde::{Deserialize, Serialize};

/// Subscription tier of a profile.
///
/// `Unlimited` exempts the holder from credit deduction when claiming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "subscription_tier", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Unlimited,
}

impl SubscriptionTier {
    /// Whether claims under this tier skip the credit debit.
    #[must_use]
    pub const fn bypasses_credits(self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}

impl std::str::FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "unlimited" => Ok(Self::Unlimited),
            _ => Err(format!("invalid subscription tier: {s}")),
        }
    }
}

/// Lifecycle of a prompt request.
///
/// Only `Pending` requests count against the weekly limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "request_status"))]
pub enum RequestStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "In Progress"))]
    InProgress,
    Completed,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

/// Capability grant stored in `user_roles`.
///
/// Presence of a row grants the role; absence means an ordinary user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "app_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    /// Full access to prompt inventory, profiles and requests.
    Admin,
}

impl std::fmt::Display for AppRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
        }
    }
}

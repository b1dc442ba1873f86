//! Credit amounts.
//!
//! Balances and prompt costs are both non-negative whole numbers of credits.
//! The database stores them as `INTEGER` with `CHECK (... >= 0)`; this type
//! carries the same guarantee through the Rust side so a negative balance
//! cannot be constructed, only detected on a corrupt row.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error converting a raw database value into [`Credits`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditsError {
    /// The raw value was below zero.
    #[error("credit amount cannot be negative (got {0})")]
    Negative(i64),
    /// The amount does not fit the database column.
    #[error("credit amount {0} exceeds the storable maximum")]
    Overflow(u32),
}

/// A non-negative number of credits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Credits(u32);

impl Credits {
    /// Zero credits.
    pub const ZERO: Self = Self(0);

    /// Create a credit amount.
    #[must_use]
    pub const fn new(amount: u32) -> Self {
        Self(amount)
    }

    /// The raw amount.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Subtract `cost`, returning `None` when the balance would go negative.
    #[must_use]
    pub const fn checked_sub(self, cost: Self) -> Option<Self> {
        match self.0.checked_sub(cost.0) {
            Some(rest) => Some(Self(rest)),
            None => None,
        }
    }

    /// Convert from a database `INTEGER`.
    ///
    /// # Errors
    ///
    /// Returns `CreditsError::Negative` for values below zero.
    pub fn from_db(raw: i32) -> Result<Self, CreditsError> {
        u32::try_from(raw)
            .map(Self)
            .map_err(|_| CreditsError::Negative(i64::from(raw)))
    }

    /// Convert to a database `INTEGER`.
    ///
    /// # Errors
    ///
    /// Returns `CreditsError::Overflow` above `i32::MAX`.
    pub fn to_db(self) -> Result<i32, CreditsError> {
        i32::try_from(self.0).map_err(|_| CreditsError::Overflow(self.0))
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Credits {
    fn from(amount: u32) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_sub() {
        assert_eq!(Credits::new(10).checked_sub(Credits::new(3)), Some(Credits::new(7)));
        assert_eq!(Credits::new(3).checked_sub(Credits::new(3)), Some(Credits::ZERO));
        assert_eq!(Credits::new(2).checked_sub(Credits::new(3)), None);
    }

    #[test]
    fn test_from_db_rejects_negative() {
        assert_eq!(Credits::from_db(5).unwrap(), Credits::new(5));
        assert_eq!(Credits::from_db(-1), Err(CreditsError::Negative(-1)));
    }

    #[test]
    fn test_to_db_overflow() {
        assert_eq!(Credits::new(7).to_db().unwrap(), 7);
        assert!(Credits::new(u32::MAX).to_db().is_err());
    }
}

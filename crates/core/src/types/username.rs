//! Display names chosen by users.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameError {
    #[error("username must be at least {min} characters")]
    TooShort { min: usize },
    #[error("username must be at most {max} characters")]
    TooLong { max: usize },
}

/// A profile username, 3 to 20 characters after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub const MIN_LENGTH: usize = 3;
    pub const MAX_LENGTH: usize = 20;

    /// Parse a username.
    ///
    /// # Errors
    ///
    /// Returns `UsernameError` when the trimmed length is out of range.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let s = s.trim();
        let len = s.chars().count();
        if len < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if len > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(name: Username) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Username::parse("abc").is_ok());
        assert!(Username::parse(&"x".repeat(20)).is_ok());
        assert_eq!(Username::parse(" ab "), Err(UsernameError::TooShort { min: 3 }));
        assert_eq!(
            Username::parse(&"x".repeat(21)),
            Err(UsernameError::TooLong { max: 20 })
        );
    }
}

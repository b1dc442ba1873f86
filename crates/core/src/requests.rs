//! The weekly prompt-request throttle.
//!
//! A user may hold at most one `Pending` request created within the last
//! [`REQUEST_WINDOW`]. A request that moved to `In Progress` or `Completed`
//! no longer counts, and neither does a `Pending` request older than the
//! window. The server runs [`check_window`] under a row lock on the caller's
//! profile so two concurrent submissions cannot both pass.

use chrono::{DateTime, Duration, Utc};

/// Rolling window for the one-pending-request rule.
pub const REQUEST_WINDOW: Duration = Duration::days(7);

/// Errors from submitting a prompt request.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("request details cannot be empty")]
    EmptyDetails,

    #[error("request details must be at most {max} characters")]
    DetailsTooLong { max: usize },

    #[error("only one pending request per week is allowed; try again after {retry_after}")]
    LimitReached { retry_after: DateTime<Utc> },

    #[error("request transaction failed: {0}")]
    TransactionFailed(String),
}

impl RequestError {
    /// Stable machine-readable code for API clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyDetails => "empty_details",
            Self::DetailsTooLong { .. } => "details_too_long",
            Self::LimitReached { .. } => "request_limit_reached",
            Self::TransactionFailed(_) => "transaction_failed",
        }
    }
}

/// Trimmed, bounded free text describing the prompt a user wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDetails(String);

impl RequestDetails {
    pub const MAX_LENGTH: usize = 2000;

    /// Parse request details.
    ///
    /// # Errors
    ///
    /// Returns `EmptyDetails` for blank input and `DetailsTooLong` above
    /// [`Self::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, RequestError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RequestError::EmptyDetails);
        }
        if s.chars().count() > Self::MAX_LENGTH {
            return Err(RequestError::DetailsTooLong {
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

/// Check whether a new request may be submitted at `now`.
///
/// `latest_pending` is the creation time of the caller's newest request that
/// is still `Pending`, if any.
///
/// # Errors
///
/// Returns `LimitReached` with the instant the blocking request leaves the
/// window.
pub fn check_window(
    latest_pending: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), RequestError> {
    let Some(created_at) = latest_pending else {
        return Ok(());
    };

    let retry_after = created_at + REQUEST_WINDOW;
    if now < retry_after {
        return Err(RequestError::LimitReached { retry_after });
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn at(day: u32) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(&format!("2026-03-{day:02}T12:00:00Z"))
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_no_pending_request_allows() {
        assert!(check_window(None, at(1)).is_ok());
    }

    #[test]
    fn test_pending_inside_window_blocks() {
        let err = check_window(Some(at(1)), at(5)).unwrap_err();
        assert_eq!(err, RequestError::LimitReached { retry_after: at(8) });
        assert_eq!(err.code(), "request_limit_reached");
    }

    #[test]
    fn test_window_is_exactly_seven_days() {
        let created = at(1);
        let just_before = created + REQUEST_WINDOW - Duration::seconds(1);
        assert!(check_window(Some(created), just_before).is_err());
        assert!(check_window(Some(created), created + REQUEST_WINDOW).is_ok());
    }

    #[test]
    fn test_details_are_trimmed_and_bounded() {
        assert_eq!(
            RequestDetails::parse("  a cyberpunk city prompt ").unwrap().as_str(),
            "a cyberpunk city prompt"
        );
        assert_eq!(RequestDetails::parse(" \n "), Err(RequestError::EmptyDetails));
        assert!(matches!(
            RequestDetails::parse(&"x".repeat(2001)),
            Err(RequestError::DetailsTooLong { max: 2000 })
        ));
    }
}

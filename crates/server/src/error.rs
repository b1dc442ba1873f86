//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding. All route handlers return `Result<T, AppError>`.
//!
//! Every error renders as:
//!
//! ```json
//! {"error": {"code": "insufficient_credits", "message": "..."}}
//! ```
//!
//! `code` is stable and meant for clients to branch on.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use prompt_market_core::claim::ClaimError;
use prompt_market_core::requests::RequestError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::google::OAuthError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Google sign-in failed.
    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),

    /// Claim rejected or failed.
    #[error("Claim error: {0}")]
    Claim(#[from] ClaimError),

    /// Prompt request rejected or failed.
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Invalid input from the client.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No signed-in user.
    #[error("Not authenticated")]
    Unauthorized,

    /// Signed in, but lacking the required role.
    #[error("Forbidden")]
    Forbidden,

    /// An administrator already exists.
    #[error("An administrator already exists")]
    AdminExists,

    /// The per-client rate limit was hit.
    #[error("Too many requests; retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session error: {err}"))
    }
}

impl AppError {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => "not_found",
                RepositoryError::Conflict(_) => "conflict",
                RepositoryError::OutOfRange(_) => "out_of_range",
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => "internal",
            },
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) => "invalid_email",
                AuthError::InvalidCredentials => "invalid_credentials",
                AuthError::UserAlreadyExists => "user_exists",
                AuthError::WeakPassword(_) => "weak_password",
                AuthError::Repository(_) | AuthError::PasswordHash => "internal",
            },
            Self::OAuth(err) => match err {
                OAuthError::NotConfigured => "oauth_not_configured",
                OAuthError::UnverifiedEmail => "unverified_email",
                OAuthError::InvalidEmail(_) => "invalid_email",
                OAuthError::Http(_) | OAuthError::TokenExchange(_) => "oauth_failed",
            },
            Self::Claim(err) => err.code(),
            Self::Request(err) => err.code(),
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized => "not_authenticated",
            Self::Forbidden => "forbidden",
            Self::AdminExists => "admin_exists",
            Self::RateLimited { .. } => "rate_limited",
            Self::Internal(_) => "internal",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::OutOfRange(_) => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::OAuth(err) => match err {
                OAuthError::NotConfigured => StatusCode::NOT_FOUND,
                OAuthError::UnverifiedEmail => StatusCode::FORBIDDEN,
                OAuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                OAuthError::Http(_) | OAuthError::TokenExchange(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Claim(err) => match err {
                ClaimError::AlreadyClaimed => StatusCode::CONFLICT,
                ClaimError::InsufficientCredits { .. } => StatusCode::PAYMENT_REQUIRED,
                ClaimError::PromptNotFound => StatusCode::NOT_FOUND,
                ClaimError::TransactionFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::Request(err) => match err {
                RequestError::EmptyDetails | RequestError::DetailsTooLong { .. } => {
                    StatusCode::BAD_REQUEST
                }
                RequestError::LimitReached { .. } => StatusCode::TOO_MANY_REQUESTS,
                RequestError::TransactionFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::AdminExists => StatusCode::CONFLICT,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Server-side details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Claim(ClaimError::TransactionFailed(_))
            | Self::Request(RequestError::TransactionFailed(_)) => {
                "The operation did not complete; check its status before retrying".to_string()
            }
            Self::OAuth(OAuthError::Http(_) | OAuthError::TokenExchange(_)) => {
                "Google sign-in failed".to_string()
            }
            Self::Auth(err) => err.to_string(),
            Self::Claim(err) => err.to_string(),
            Self::Request(err) => err.to_string(),
            Self::OAuth(err) => err.to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg) | RepositoryError::OutOfRange(msg)) => {
                msg.clone()
            }
            Self::Unauthorized | Self::Forbidden | Self::AdminExists | Self::RateLimited { .. } => {
                self.to_string()
            }
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                code = self.code(),
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.public_message(),
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

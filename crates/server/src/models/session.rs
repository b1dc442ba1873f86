//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use prompt_market_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user. Handlers
/// pass `id` explicitly into every repository call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for Google OAuth state (CSRF protection).
    pub const GOOGLE_OAUTH_STATE: &str = "google_oauth_state";

    /// Key for the PKCE code verifier of an in-flight Google login.
    pub const GOOGLE_PKCE_VERIFIER: &str = "google_pkce_verifier";
}

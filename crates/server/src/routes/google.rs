//! Google sign-in route handlers.
//!
//! - Login: stores CSRF state and a PKCE verifier, redirects to Google
//! - Callback: checks state, exchanges the code, signs the user in and
//!   redirects to the app with `?auth_error=<code>` on failure

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::Result;
use crate::models::session_keys;
use crate::services::auth::AuthService;
use crate::services::google::{self, PROVIDER};
use crate::state::AppState;

const STATE_LENGTH: usize = 32;
const VERIFIER_LENGTH: usize = 64;

/// Query parameters from the Google OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set when the user denied access or Google failed.
    pub error: Option<String>,
}

fn redirect_uri(state: &AppState) -> String {
    format!("{}/auth/google/callback", state.config().base_url)
}

fn fail(state: &AppState, code: &str) -> Response {
    Redirect::to(&format!("{}/?auth_error={code}", state.config().base_url)).into_response()
}

/// Start a Google login.
///
/// # Route
///
/// `GET /auth/google/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Result<Response> {
    let client = state.google()?;

    let oauth_state = google::random_token(STATE_LENGTH);
    let verifier = google::random_token(VERIFIER_LENGTH);

    session
        .insert(session_keys::GOOGLE_OAUTH_STATE, &oauth_state)
        .await?;
    session
        .insert(session_keys::GOOGLE_PKCE_VERIFIER, &verifier)
        .await?;

    let auth_url = client.authorization_url(&redirect_uri(&state), &oauth_state, &verifier);
    Ok(Redirect::to(&auth_url).into_response())
}

/// Finish a Google login.
///
/// # Route
///
/// `GET /auth/google/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    let client = state.google()?;

    // One-time use, whatever the outcome
    let stored_state = session
        .remove::<String>(session_keys::GOOGLE_OAUTH_STATE)
        .await?;
    let verifier = session
        .remove::<String>(session_keys::GOOGLE_PKCE_VERIFIER)
        .await?;

    if let Some(error) = query.error {
        tracing::warn!(%error, "Google OAuth error");
        return Ok(fail(&state, "google_denied"));
    }

    let (Some(code), Some(returned_state), Some(verifier)) = (query.code, query.state, verifier)
    else {
        tracing::warn!("Google OAuth callback missing code, state or verifier");
        return Ok(fail(&state, "invalid_callback"));
    };

    if stored_state.as_deref() != Some(returned_state.as_str()) {
        tracing::warn!("Google OAuth state mismatch");
        return Ok(fail(&state, "invalid_state"));
    }

    let identity = match client
        .exchange_code(&code, &redirect_uri(&state), &verifier)
        .await
    {
        Ok(token) => client.userinfo(&token).await,
        Err(e) => Err(e),
    };

    let identity = match identity {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!(error = %e, "Google sign-in failed");
            return Ok(fail(&state, "google_failed"));
        }
    };

    let user = AuthService::new(state.pool())
        .sign_in_with_identity(PROVIDER, &identity.subject, &identity.email)
        .await?;

    super::auth::start_session(&state, &session, user).await?;

    tracing::info!("Google user authenticated");

    Ok(Redirect::to(&format!("{}/", state.config().base_url)).into_response())
}

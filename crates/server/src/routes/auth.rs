//! Email/password authentication route handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use prompt_market_core::profile::Profile;

use crate::db::profiles::ProfileRepository;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Credentials for sign-up and login.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Signed-in user with their profile.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub profile: Profile,
}

/// Start a session for `user` and load (or create) their profile.
pub(super) async fn start_session(
    state: &AppState,
    session: &Session,
    user: User,
) -> Result<SessionResponse> {
    let profile = ProfileRepository::new(state.pool())
        .get_or_create(user.id, &user.email)
        .await?;

    set_current_user(
        session,
        &CurrentUser {
            id: user.id,
            email: user.email.clone(),
        },
    )
    .await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(SessionResponse { user, profile })
}

/// Create an account and sign in.
///
/// # Route
///
/// `POST /auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<Credentials>,
) -> Result<Response> {
    let user = AuthService::new(state.pool())
        .sign_up(&body.email, &body.password)
        .await?;

    tracing::info!(user_id = %user.id, "Account created");

    let response = start_session(&state, &session, user).await?;
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Sign in with email and password.
///
/// # Route
///
/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<Credentials>,
) -> Result<Json<SessionResponse>> {
    let user = match AuthService::new(state.pool())
        .sign_in(&body.email, &body.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            return Err(e.into());
        }
    };

    tracing::info!(user_id = %user.id, "Signed in");

    Ok(Json(start_session(&state, &session, user).await?))
}

/// End the session.
///
/// # Route
///
/// `POST /auth/logout`
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

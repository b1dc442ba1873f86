//! Routes for the signed-in user: profile, claims, prompt requests.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use prompt_market_core::Username;
use prompt_market_core::profile::Profile;
use prompt_market_core::requests::RequestDetails;

use crate::db::claims::ClaimRepository;
use crate::db::profiles::ProfileRepository;
use crate::db::requests::RequestRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{ClaimedPrompt, CurrentUser, PromptRequest};
use crate::state::AppState;

/// The signed-in user, their profile and capabilities.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: CurrentUser,
    pub profile: Profile,
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfile {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct NewRequest {
    pub request_details: String,
}

/// # Route
///
/// `GET /api/me`
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<MeResponse>> {
    let profile = ProfileRepository::new(state.pool())
        .get_or_create(user.id, &user.email)
        .await?;
    let is_admin = state.admin_check().is_admin(state.pool(), user.id).await;

    Ok(Json(MeResponse {
        user,
        profile,
        is_admin,
    }))
}

/// # Route
///
/// `PATCH /api/me/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<UpdateProfile>,
) -> Result<Json<Profile>> {
    let username =
        Username::parse(&body.username).map_err(|e| AppError::Validation(e.to_string()))?;

    let profiles = ProfileRepository::new(state.pool());
    profiles.get_or_create(user.id, &user.email).await?;
    let profile = profiles.update_username(user.id, &username).await?;

    Ok(Json(profile))
}

/// # Route
///
/// `GET /api/me/claims`
pub async fn claims(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<ClaimedPrompt>>> {
    let claims = ClaimRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(claims))
}

/// # Route
///
/// `GET /api/me/requests`
pub async fn requests(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<PromptRequest>>> {
    let requests = RequestRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(requests))
}

/// Submit a prompt request. One pending request per rolling week.
///
/// # Route
///
/// `POST /api/me/requests`
pub async fn submit_request(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<NewRequest>,
) -> Result<(StatusCode, Json<PromptRequest>)> {
    let details = RequestDetails::parse(&body.request_details)?;

    let request = RequestRepository::new(state.pool())
        .submit(user.id, &user.email, &details, Utc::now())
        .await
        .inspect_err(|e| tracing::info!(user_id = %user.id, code = e.code(), "Request rejected"))?;

    tracing::info!(user_id = %user.id, request_id = %request.id, "Prompt request submitted");

    Ok((StatusCode::CREATED, Json(request)))
}

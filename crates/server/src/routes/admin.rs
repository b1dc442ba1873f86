//! Administrator route handlers.
//!
//! Everything except the bootstrap pair requires [`RequireAdmin`].

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use prompt_market_core::catalog::{NewPrompt, Prompt};
use prompt_market_core::profile::Profile;
use prompt_market_core::{
    Credits, PromptId, PromptRequestId, RequestStatus, SubscriptionTier, UserId,
};

use crate::db::profiles::ProfileRepository;
use crate::db::prompts::PromptRepository;
use crate::db::requests::RequestRepository;
use crate::db::roles::RoleRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::PromptRequest;
use crate::state::AppState;

/// Partial profile edit. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub credit_balance: Option<Credits>,
    pub subscription_tier: Option<SubscriptionTier>,
}

#[derive(Debug, Deserialize)]
pub struct RequestUpdate {
    pub status: RequestStatus,
    pub completed_prompt_id: Option<PromptId>,
}

#[derive(Debug, Serialize)]
pub struct BootstrapStatus {
    pub admin_exists: bool,
}

// =============================================================================
// Prompts
// =============================================================================

/// `GET /api/admin/prompts`
pub async fn list_prompts(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<Prompt>>> {
    Ok(Json(PromptRepository::new(state.pool()).list_all().await?))
}

/// `POST /api/admin/prompts`
pub async fn create_prompt(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<NewPrompt>,
) -> Result<(StatusCode, Json<Prompt>)> {
    let new_prompt = body
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let prompt = PromptRepository::new(state.pool())
        .create(&new_prompt)
        .await?;

    tracing::info!(admin_id = %admin.id, prompt_id = %prompt.id(), "Prompt created");
    Ok((StatusCode::CREATED, Json(prompt)))
}

/// `DELETE /api/admin/prompts/{id}`
pub async fn delete_prompt(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<PromptId>,
) -> Result<StatusCode> {
    PromptRepository::new(state.pool()).delete(id).await?;

    tracing::info!(admin_id = %admin.id, prompt_id = %id, "Prompt deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Profiles
// =============================================================================

/// `GET /api/admin/profiles`
pub async fn list_profiles(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<Profile>>> {
    Ok(Json(ProfileRepository::new(state.pool()).list_all().await?))
}

/// `PATCH /api/admin/profiles/{id}`
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<Profile>> {
    if body.credit_balance.is_none() && body.subscription_tier.is_none() {
        return Err(AppError::Validation(
            "nothing to update: set credit_balance or subscription_tier".to_string(),
        ));
    }

    let profile = ProfileRepository::new(state.pool())
        .admin_update(id, body.credit_balance, body.subscription_tier)
        .await?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %id,
        credit_balance = %profile.credit_balance,
        tier = %profile.subscription_tier,
        "Profile updated by admin"
    );
    Ok(Json(profile))
}

// =============================================================================
// Requests
// =============================================================================

/// `GET /api/admin/requests`
pub async fn list_requests(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<PromptRequest>>> {
    Ok(Json(RequestRepository::new(state.pool()).list_all().await?))
}

/// `PATCH /api/admin/requests/{id}`
pub async fn update_request(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<PromptRequestId>,
    Json(body): Json<RequestUpdate>,
) -> Result<Json<PromptRequest>> {
    let request = RequestRepository::new(state.pool())
        .update_status(id, body.status, body.completed_prompt_id)
        .await?;

    tracing::info!(admin_id = %admin.id, request_id = %id, status = ?request.status, "Request updated");
    Ok(Json(request))
}

// =============================================================================
// First-admin bootstrap
// =============================================================================

/// Whether any administrator exists yet.
///
/// `GET /api/admin/bootstrap`
pub async fn bootstrap_status(State(state): State<AppState>) -> Result<Json<BootstrapStatus>> {
    let admins = RoleRepository::new(state.pool()).count_admins().await?;
    Ok(Json(BootstrapStatus {
        admin_exists: admins > 0,
    }))
}

/// Make the caller the first administrator.
///
/// `POST /api/admin/bootstrap`
pub async fn bootstrap(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<(StatusCode, Json<BootstrapStatus>)> {
    if !RoleRepository::new(state.pool())
        .bootstrap_admin(user.id)
        .await?
    {
        return Err(AppError::AdminExists);
    }

    state.admin_check().invalidate(user.id).await;
    tracing::warn!(user_id = %user.id, "First administrator created");

    Ok((
        StatusCode::CREATED,
        Json(BootstrapStatus { admin_exists: true }),
    ))
}

//! Catalog route handlers.
//!
//! Listing and detail are public. `prompt_text` is only returned to users who
//! claimed the prompt, and to administrators.

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;

use prompt_market_core::PromptId;
use prompt_market_core::catalog::{CatalogFilter, Facets, Prompt, PromptSummary};

use crate::db::claims::ClaimRepository;
use crate::db::prompts::PromptRepository;
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::ClaimReceipt;
use crate::services::claims::ClaimService;
use crate::state::AppState;

/// A catalog entry as seen by the caller.
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub prompt: PromptSummary,
    /// Whether the caller has claimed this prompt. Always false when anonymous.
    pub claimed: bool,
}

/// Catalog listing with filter options.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub prompts: Vec<CatalogEntry>,
    /// Facets over the whole catalog, not just the filtered page.
    pub facets: Facets,
}

/// A single prompt as seen by the caller.
#[derive(Debug, Serialize)]
pub struct PromptDetail {
    #[serde(flatten)]
    pub prompt: PromptSummary,
    pub claimed: bool,
    /// Present only when the caller may read it.
    pub prompt_text: Option<String>,
}

impl PromptDetail {
    fn new(prompt: Prompt, claimed: bool, is_admin: bool) -> Self {
        let prompt_text = (claimed || is_admin).then_some(prompt.prompt_text);
        Self {
            prompt: prompt.summary,
            claimed,
            prompt_text,
        }
    }
}

/// List the catalog.
///
/// # Route
///
/// `GET /api/prompts?search=&platform=&category=`
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(filter): Query<CatalogFilter>,
) -> Result<Json<CatalogResponse>> {
    let all = PromptRepository::new(state.pool()).list_summaries().await?;
    let facets = Facets::from_prompts(&all);

    let claimed: HashSet<PromptId> = match &user {
        Some(user) => ClaimRepository::new(state.pool())
            .claimed_ids(user.id)
            .await?
            .into_iter()
            .collect(),
        None => HashSet::new(),
    };

    let prompts = filter
        .apply(all)
        .into_iter()
        .map(|prompt| CatalogEntry {
            claimed: claimed.contains(&prompt.id),
            prompt,
        })
        .collect();

    Ok(Json(CatalogResponse { prompts, facets }))
}

/// Show one prompt.
///
/// # Route
///
/// `GET /api/prompts/{id}`
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<PromptId>,
) -> Result<Json<PromptDetail>> {
    let prompt = PromptRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Prompt".to_string()))?;

    let (claimed, is_admin) = match &user {
        Some(user) => {
            let claimed = ClaimRepository::new(state.pool())
                .is_claimed(user.id, id)
                .await?;
            // Skip the role lookup when the claim already grants access
            let is_admin = !claimed && state.admin_check().is_admin(state.pool(), user.id).await;
            (claimed, is_admin)
        }
        None => (false, false),
    };

    Ok(Json(PromptDetail::new(prompt, claimed, is_admin)))
}

/// Claim a prompt with credits.
///
/// # Route
///
/// `POST /api/prompts/{id}/claim`
pub async fn claim(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<PromptId>,
) -> Result<Json<ClaimReceipt>> {
    let receipt = ClaimService::new(state.pool(), state.config().claim_timeout)
        .claim(user.id, &user.email, id)
        .await?;

    Ok(Json(receipt))
}

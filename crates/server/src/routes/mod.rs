//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness
//! GET    /health/ready                - Database readiness
//!
//! # Auth (rate limited)
//! POST   /auth/signup                 - Create account and sign in
//! POST   /auth/login                  - Email/password sign-in
//! POST   /auth/logout                 - End session
//! GET    /auth/google/login           - Redirect to Google
//! GET    /auth/google/callback        - Google OAuth callback
//!
//! # Catalog
//! GET    /api/prompts                 - Listing + facets (?search, platform, category)
//! GET    /api/prompts/{id}            - Detail (text only for claimers and admins)
//! POST   /api/prompts/{id}/claim      - Claim with credits
//!
//! # Current user (requires auth)
//! GET    /api/me                      - User, profile, is_admin
//! PATCH  /api/me/profile              - Change username
//! GET    /api/me/claims               - Claimed prompts
//! GET    /api/me/requests             - Own prompt requests
//! POST   /api/me/requests             - Submit a prompt request
//!
//! # Admin (requires admin role)
//! GET    /api/admin/prompts           - All prompts with text
//! POST   /api/admin/prompts           - Create prompt
//! DELETE /api/admin/prompts/{id}      - Delete prompt
//! GET    /api/admin/profiles          - All profiles
//! PATCH  /api/admin/profiles/{id}     - Edit balance / tier
//! GET    /api/admin/requests          - All prompt requests
//! PATCH  /api/admin/requests/{id}     - Move request status
//! GET    /api/admin/bootstrap         - Whether an admin exists
//! POST   /api/admin/bootstrap         - Become the first admin (requires auth)
//! ```

pub mod admin;
pub mod auth;
pub mod google;
pub mod me;
pub mod prompts;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/google/login", get(google::login))
        .route("/google/callback", get(google::callback))
        .layer(auth_rate_limiter())
}

/// Create the catalog routes router.
pub fn prompt_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(prompts::index))
        .route("/{id}", get(prompts::show))
        .route("/{id}/claim", post(prompts::claim))
}

/// Create the current-user routes router.
pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(me::show))
        .route("/profile", patch(me::update_profile))
        .route("/claims", get(me::claims))
        .route("/requests", get(me::requests).post(me::submit_request))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/prompts",
            get(admin::list_prompts).post(admin::create_prompt),
        )
        .route("/prompts/{id}", axum::routing::delete(admin::delete_prompt))
        .route("/profiles", get(admin::list_profiles))
        .route("/profiles/{id}", patch(admin::update_profile))
        .route("/requests", get(admin::list_requests))
        .route("/requests/{id}", patch(admin::update_request))
        .route(
            "/bootstrap",
            get(admin::bootstrap_status).post(admin::bootstrap),
        )
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes())
        .nest("/api/prompts", prompt_routes())
        .nest("/api/me", me_routes())
        .nest("/api/admin", admin_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

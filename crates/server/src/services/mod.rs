//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Email/password and external-identity sign-in
//! - `google` - Google OAuth client (PKCE)
//! - `admin_check` - Cached admin role lookups
//! - `claims` - The claim transaction under a deadline

pub mod admin_check;
pub mod auth;
pub mod claims;
pub mod google;

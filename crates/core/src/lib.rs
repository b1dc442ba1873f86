//! Prompt Market Core - Domain types and transactional decision logic.
//!
//! This crate provides the types and pure decision functions shared by the
//! Prompt Market components:
//! - `server` - JSON API, sessions, and `PostgreSQL` repositories
//! - `cli` - Migrations, admin bootstrap, and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains no I/O, no database access and no HTTP clients.
//! The server runs these decisions inside its database transactions, so the
//! rules for claiming a prompt or submitting a request live in one place and
//! can be tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, credits, usernames and statuses
//! - [`claim`] - The credit-claim decision (already claimed, unlimited bypass, balance check)
//! - [`requests`] - The rolling weekly prompt-request throttle
//! - [`catalog`] - Catalog filtering, facets, and new-prompt validation
//! - [`profile`] - Profile defaults for lazily created profiles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod claim;
pub mod profile;
pub mod requests;
pub mod types;

pub use types::*;

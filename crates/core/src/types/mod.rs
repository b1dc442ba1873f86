//! Core types for Prompt Market.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credits;
pub mod email;
pub mod id;
pub mod status;
pub mod username;

pub use credits::{Credits, CreditsError};
pub use email::{Email, EmailError};
pub use id::*;
pub use status::*;
pub use username::{Username, UsernameError};

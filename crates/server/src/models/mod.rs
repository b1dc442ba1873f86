//! Domain models owned by the server.
//!
//! Catalog, claim and profile types shared with the CLI live in
//! `prompt_market_core`; these are the shapes only the server produces.

pub mod market;
pub mod session;
pub mod user;

pub use market::{ClaimReceipt, ClaimedPrompt, PromptRequest};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;

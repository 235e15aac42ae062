//! Domain models for the store front.
//!
//! - `user` - Accounts and API tokens
//! - `session` - Values kept in the cookie session

pub mod session;
pub mod user;

pub use session::{CurrentUser, Flash, FlashLevel, keys as session_keys};
pub use user::{AuthToken, User};

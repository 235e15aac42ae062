//! Business logic services for the store front.
//!
//! - `auth` - Accounts, password login, and API tokens
//! - `catalog` - Catalog gateway: filtering and the upstream failure policy

pub mod auth;
pub mod catalog;

//! Platzi Core - Shared types library.
//!
//! Types used by the store front and its tests:
//! - Newtype IDs for users, products and categories
//! - Validated `Email` and `Username` values
//!
//! The crate holds no I/O: no HTTP clients, no stores, no async.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

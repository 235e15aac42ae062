//! Platzi store front library.
//!
//! An axum web application that manages user accounts and sessions locally
//! and proxies product CRUD to the Platzi Fake Store catalog API. Exposed as
//! a library so the binary and the integration tests share one router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;

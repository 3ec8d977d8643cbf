//! # Planner Shared Library
//!
//! Data layer of the planner: accounts, kanban boards with invitations and
//! notifications, and the habit tracker. Everything here is a typed record
//! plus async functions over a `PgPool`.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and embedded migrations
//! - `error`: `StoreError`, the result taxonomy of every store call
//! - `auth`: Password hashing and registration form validation
//! - `models`: Database models and their operations

pub mod auth;
pub mod db;
pub mod error;
pub mod models;

/// Current version of the planner shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

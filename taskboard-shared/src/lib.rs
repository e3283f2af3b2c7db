//! # Taskboard Shared Library
//!
//! This crate contains the types, persistence layer, and authentication
//! primitives shared by the Taskboard API server and client.
//!
//! ## Module Organization
//!
//! - `models`: Users, tasks, and the joined task view
//! - `store`: The `TaskStore` trait with Postgres and in-memory backends
//! - `auth`: Password hashing, JWT tokens, middleware, and capability checks
//! - `db`: Connection pool and embedded migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # Taskboard API Server Library
//!
//! REST API for a small-team task board: account registration and login,
//! and task CRUD scoped to each task's creator and assignee.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

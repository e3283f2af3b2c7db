/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and the user directory
/// - `tasks`: Task CRUD scoped to the caller

pub mod health;
pub mod auth;
pub mod tasks;

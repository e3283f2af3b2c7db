/// Middleware for the API server
///
/// Authentication lives in `app::jwt_auth_layer`; this module holds the
/// layers applied to every response.

pub mod security;

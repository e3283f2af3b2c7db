/// Database layer
///
/// - `pool`: PostgreSQL connection pool with a health check
/// - `migrations`: embedded schema migrations
///
/// Queries live next to their models in [`crate::models`]; the API reaches
/// them through [`crate::store::PgStore`].

pub mod pool;
pub mod migrations;

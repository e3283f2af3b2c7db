/// Data models for Taskboard
///
/// This module contains the persisted records and their Postgres queries.
///
/// # Models
///
/// - `user`: User accounts and the public `{ _id, name }` projection
/// - `task`: Tasks, their priority/status enums, and the joined view
///   returned by the API (creator and assignee names resolved)
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{User, CreateUser};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     name: "Ada".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod user;

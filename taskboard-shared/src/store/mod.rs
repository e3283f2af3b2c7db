//! Persistence layer.
//!
//! Handlers talk to a [`TaskStore`] rather than to a connection pool, so
//! the same router runs against Postgres in production and against the
//! in-memory store in tests and demos.
//!
//! - [`postgres::PgStore`]: sqlx-backed, delegates to the model queries
//! - [`memory::MemoryStore`]: maps behind `RwLock`, mirrors the Postgres
//!   constraints (unique email, existing creator/assignee)

mod error;
pub mod memory;
pub mod postgres;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    task::{CreateTask, Task, TaskDetails, UpdateTask},
    user::{CreateUser, User, UserSummary},
};

/// Storage operations used by the API.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Verifies the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;

    // ---------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------

    /// Creates a user. Fails with `AlreadyExists` on a duplicate email.
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Gets a user by ID.
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Gets a user by (normalized) email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Lists all users as `{ _id, name }`, ordered by name.
    async fn list_users(&self) -> StoreResult<Vec<UserSummary>>;

    // ---------------------------------------------------------------------
    // Tasks
    // ---------------------------------------------------------------------

    /// Creates a task. Fails with `InvalidReference` if the creator or
    /// assignee does not exist.
    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;

    /// Gets a task by ID.
    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Gets a task by ID with creator/assignee names resolved.
    async fn find_task_details(&self, id: Uuid) -> StoreResult<Option<TaskDetails>>;

    /// Lists tasks the user created or is assigned to, newest first.
    async fn list_tasks_for_user(&self, user_id: Uuid) -> StoreResult<Vec<TaskDetails>>;

    /// Applies a partial update. Returns `None` if the task is gone.
    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Option<Task>>;

    /// Deletes a task. Returns whether a record was removed.
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;
}

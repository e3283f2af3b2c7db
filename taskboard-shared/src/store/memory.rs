//! In-memory store for tests and local demos.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskStore};
use crate::models::{
    task::{CreateTask, Task, TaskDetails, UpdateTask},
    user::{normalize_email, CreateUser, User, UserSummary},
};

/// In-memory store.
///
/// Enforces the same constraints as the Postgres schema: emails are
/// unique and tasks may only reference existing users.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn summary_of(users: &HashMap<Uuid, User>, id: Uuid) -> StoreResult<UserSummary> {
    users
        .get(&id)
        .map(UserSummary::from)
        .ok_or_else(|| StoreError::not_found("User", id.to_string()))
}

fn details_of(users: &HashMap<Uuid, User>, task: &Task) -> StoreResult<TaskDetails> {
    let created_by = summary_of(users, task.created_by)?;
    let assigned_to = summary_of(users, task.assigned_to)?;
    Ok(TaskDetails::from_parts(task.clone(), created_by, assigned_to))
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        let email = normalize_email(&data.email);
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::already_exists("User", email));
        }

        let user = User::new(CreateUser { email, ..data });
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        let email = normalize_email(email);
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<UserSummary>> {
        let users = self.users.read().await;
        let mut result: Vec<UserSummary> = users.values().map(UserSummary::from).collect();
        result.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    // =========================================================================
    // Task operations
    // =========================================================================

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        let users = self.users.read().await;
        for id in [data.created_by, data.assigned_to] {
            if !users.contains_key(&id) {
                return Err(StoreError::InvalidReference(format!("user {}", id)));
            }
        }

        let task = Task::new(data);
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).cloned())
    }

    async fn find_task_details(&self, id: Uuid) -> StoreResult<Option<TaskDetails>> {
        let users = self.users.read().await;
        let tasks = self.tasks.read().await;
        tasks.get(&id).map(|task| details_of(&users, task)).transpose()
    }

    async fn list_tasks_for_user(&self, user_id: Uuid) -> StoreResult<Vec<TaskDetails>> {
        let users = self.users.read().await;
        let tasks = self.tasks.read().await;

        let mut result = tasks
            .values()
            .filter(|t| t.created_by == user_id || t.assigned_to == user_id)
            .map(|t| details_of(&users, t))
            .collect::<StoreResult<Vec<_>>>()?;
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Option<Task>> {
        let users = self.users.read().await;
        if let Some(assignee) = data.assigned_to {
            if !users.contains_key(&assignee) {
                return Err(StoreError::InvalidReference(format!("user {}", assignee)));
            }
        }

        let mut tasks = self.tasks.write().await;
        Ok(tasks.get_mut(&id).map(|task| {
            data.apply_to(task);
            task.clone()
        }))
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.remove(&id).is_some())
    }
}

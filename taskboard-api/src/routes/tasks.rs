/// Task endpoints
///
/// Every route requires authentication. A caller only ever sees tasks they
/// created or are assigned to.
///
/// # Endpoints
///
/// - `GET /api/tasks` - Tasks the caller created or is assigned to, newest first
/// - `POST /api/tasks` - Create a task (caller becomes creator)
/// - `GET /api/tasks/:id` - Get one task
/// - `PUT /api/tasks/:id` - Update (creator or assignee)
/// - `DELETE /api/tasks/:id` - Delete (creator only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{authorization, middleware::AuthContext},
    models::task::{
        blank_as_none, due_date, CreateTask, TaskDetails, TaskPriority, TaskStatus, UpdateTask,
    },
};
use uuid::Uuid;
use validator::Validate;

const TASK_NOT_FOUND: &str = "Task not found";

/// Create task request
///
/// Blank strings count as missing, so `{"title": "  "}` is rejected the
/// same way as an absent title.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "due_date::deserialize")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    pub status: Option<TaskStatus>,

    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    pub assigned_to: Option<Uuid>,
}

/// Update task request
///
/// Absent or blank fields keep their current value.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "due_date::deserialize")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    pub status: Option<TaskStatus>,

    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    pub assigned_to: Option<Uuid>,
}

impl From<UpdateTaskRequest> for UpdateTask {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            priority: req.priority,
            status: req.status,
            assigned_to: req.assigned_to,
        }
    }
}

/// Body of a successful delete
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl CreateTaskRequest {
    /// Builds the record to insert, or explains why it can't
    fn into_create(self, created_by: Uuid) -> ApiResult<CreateTask> {
        let (Some(title), Some(assigned_to)) = (self.title, self.assigned_to) else {
            return Err(ApiError::BadRequest("Title and assignee are required".to_string()));
        };

        Ok(CreateTask {
            title,
            description: self.description.unwrap_or_default(),
            due_date: self.due_date,
            priority: self.priority.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            created_by,
            assigned_to,
        })
    }
}

/// Rejects assignees that don't exist
async fn ensure_user_exists(state: &AppState, user_id: Uuid) -> ApiResult<()> {
    match state.store.find_user(user_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::BadRequest("Assigned user does not exist".to_string())),
    }
}

async fn load_details(state: &AppState, id: Uuid) -> ApiResult<TaskDetails> {
    state
        .store
        .find_task_details(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))
}

/// List the caller's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<TaskDetails>>> {
    let tasks = state.store.list_tasks_for_user(auth.user_id).await?;
    Ok(Json(tasks))
}

/// Get a single task
///
/// # Errors
///
/// - `400 Bad Request`: Malformed ID
/// - `403 Forbidden`: Caller is neither creator nor assignee
/// - `404 Not Found`: No such task
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<TaskDetails>> {
    let Path(id) = path?;

    let task = load_details(&state, id).await?;
    authorization::require_view(&task, auth.user_id)?;

    Ok(Json(task))
}

/// Create a task
///
/// ```text
/// POST /api/tasks
/// { "title": "Write report", "assignedTo": "<user id>", "priority": "High" }
/// ```
///
/// Priority defaults to `Medium`, status to `Pending`.
///
/// # Errors
///
/// - `400 Bad Request`: Missing title or assignee, unknown assignee, bad or oversized field
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskDetails>)> {
    let Json(req) = payload?;
    req.validate()?;
    let data = req.into_create(auth.user_id)?;

    ensure_user_exists(&state, data.assigned_to).await?;

    let task = state.store.create_task(data).await?;

    tracing::info!(
        task_id = %task.id,
        created_by = %task.created_by,
        assigned_to = %task.assigned_to,
        "Task created"
    );

    let details = load_details(&state, task.id).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

/// Update a task
///
/// Creator and assignee may both change any field, including reassigning.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body, oversized title or unknown assignee
/// - `403 Forbidden`: Caller is neither creator nor assignee
/// - `404 Not Found`: No such task
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<TaskDetails>> {
    let Path(id) = path?;
    let Json(req) = payload?;
    req.validate()?;

    let task = state
        .store
        .find_task(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))?;

    let capability = authorization::require_modify(&task, auth.user_id)?;

    let update = UpdateTask::from(req);
    if let Some(assignee) = update.assigned_to {
        ensure_user_exists(&state, assignee).await?;
    }

    if !update.is_empty() {
        state
            .store
            .update_task(id, update)
            .await?
            .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))?;

        tracing::info!(task_id = %id, user_id = %auth.user_id, ?capability, "Task updated");
    }

    let details = load_details(&state, id).await?;
    Ok(Json(details))
}

/// Delete a task
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not the creator
/// - `404 Not Found`: No such task
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = path?;

    let task = state
        .store
        .find_task(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))?;

    authorization::require_delete(&task, auth.user_id)?;

    if !state.store.delete_task(id).await? {
        return Err(ApiError::NotFound(TASK_NOT_FOUND.to_string()));
    }

    tracing::info!(task_id = %id, user_id = %auth.user_id, "Task deleted");

    Ok(Json(MessageResponse {
        message: "Task deleted".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let assignee = Uuid::new_v4();
        let req: CreateTaskRequest = serde_json::from_value(serde_json::json!({
            "title": "Write report",
            "assignedTo": assignee,
        }))
        .unwrap();

        let creator = Uuid::new_v4();
        let data = req.into_create(creator).unwrap();
        assert_eq!(data.priority, TaskPriority::Medium);
        assert_eq!(data.status, TaskStatus::Pending);
        assert_eq!(data.description, "");
        assert_eq!(data.created_by, creator);
        assert_eq!(data.assigned_to, assignee);
        assert!(data.due_date.is_none());
    }

    #[test]
    fn test_create_request_requires_title_and_assignee() {
        let blank_title: CreateTaskRequest = serde_json::from_value(serde_json::json!({
            "title": "   ",
            "assignedTo": Uuid::new_v4(),
        }))
        .unwrap();
        assert!(matches!(
            blank_title.into_create(Uuid::new_v4()),
            Err(ApiError::BadRequest(msg)) if msg == "Title and assignee are required"
        ));

        let no_assignee: CreateTaskRequest =
            serde_json::from_value(serde_json::json!({ "title": "Plan", "assignedTo": "" })).unwrap();
        assert!(no_assignee.into_create(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_create_request_rejects_bad_values() {
        assert!(serde_json::from_value::<CreateTaskRequest>(serde_json::json!({
            "title": "Plan",
            "priority": "Urgent",
        }))
        .is_err());

        assert!(serde_json::from_value::<CreateTaskRequest>(serde_json::json!({
            "title": "Plan",
            "assignedTo": "not-a-uuid",
        }))
        .is_err());
    }

    #[test]
    fn test_update_request_blank_fields_are_ignored() {
        let req: UpdateTaskRequest = serde_json::from_value(serde_json::json!({
            "title": "",
            "description": "  ",
            "dueDate": "",
            "status": "Completed",
        }))
        .unwrap();

        let update = UpdateTask::from(req);
        assert!(update.title.is_none());
        assert!(update.description.is_none());
        assert!(update.due_date.is_none());
        assert_eq!(update.status, Some(TaskStatus::Completed));
        assert!(!update.is_empty());
    }

    #[test]
    fn test_update_request_due_date_formats() {
        let req: UpdateTaskRequest =
            serde_json::from_value(serde_json::json!({ "dueDate": "2025-03-01" })).unwrap();
        assert_eq!(
            req.due_date.map(|d| d.to_rfc3339()),
            Some("2025-03-01T00:00:00+00:00".to_string())
        );
    }
}

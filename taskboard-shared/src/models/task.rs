/// Task model and database operations
///
/// A task is owned by the user who created it and assigned to exactly one
/// user (possibly the creator). Both may edit it; only the creator may
/// delete it (see [`crate::auth::authorization`]).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('Low', 'Medium', 'High');
/// CREATE TYPE task_status AS ENUM ('Pending', 'In Progress', 'Completed');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     due_date TIMESTAMPTZ,
///     priority task_priority NOT NULL DEFAULT 'Medium',
///     status task_status NOT NULL DEFAULT 'Pending',
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     assigned_to UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Wire format
///
/// Tasks leave the server as [`TaskDetails`]: camelCase fields, `_id`
/// identifiers, and `createdBy` / `assignedTo` expanded to `{ _id, name }`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserSummary;

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// All priorities, lowest first
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskPriority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown priority: {}", s))
    }
}

/// Task progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    #[default]
    Pending,

    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,

    Completed,
}

impl TaskStatus {
    /// All statuses in workflow order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed];

    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Completed tasks are never overdue
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(|c: char| c == '-' || c == '_', " ");
        TaskStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| format!("Unknown status: {}", s))
    }
}

/// Stored task record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: Uuid,

    pub title: String,

    pub description: String,

    pub due_date: Option<DateTime<Utc>>,

    pub priority: TaskPriority,

    pub status: TaskStatus,

    /// Creator; set once from the authenticated caller
    pub created_by: Uuid,

    pub assigned_to: Uuid,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub created_by: Uuid,
    pub assigned_to: Uuid,
}

/// Partial update; `None` leaves the stored value unchanged
///
/// `created_by` is immutable and has no counterpart here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
}

impl UpdateTask {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self == &UpdateTask::default()
    }

    /// Applies the present fields to `task` and bumps `updated_at`
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(assigned_to) = self.assigned_to {
            task.assigned_to = assigned_to;
        }
        task.updated_at = Utc::now();
    }
}

/// Task with creator and assignee names resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    #[serde(rename = "_id")]
    pub id: Uuid,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub due_date: Option<DateTime<Utc>>,

    pub priority: TaskPriority,

    pub status: TaskStatus,

    pub created_by: UserSummary,

    pub assigned_to: UserSummary,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl TaskDetails {
    /// Joins a task with its creator and assignee summaries
    pub fn from_parts(task: Task, created_by: UserSummary, assigned_to: UserSummary) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            priority: task.priority,
            status: task.status,
            created_by,
            assigned_to,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }

    /// Due before `now` and not completed
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => due < now && !self.status.is_completed(),
            None => false,
        }
    }
}

/// Flat row produced by the join query
#[derive(Debug, sqlx::FromRow)]
struct TaskDetailsRow {
    id: Uuid,
    title: String,
    description: String,
    due_date: Option<DateTime<Utc>>,
    priority: TaskPriority,
    status: TaskStatus,
    created_by: Uuid,
    created_by_name: String,
    assigned_to: Uuid,
    assigned_to_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskDetailsRow> for TaskDetails {
    fn from(row: TaskDetailsRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            priority: row.priority,
            status: row.status,
            created_by: UserSummary {
                id: row.created_by,
                name: row.created_by_name,
            },
            assigned_to: UserSummary {
                id: row.assigned_to,
                name: row.assigned_to_name,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const DETAILS_SELECT: &str = r#"
    SELECT t.id, t.title, t.description, t.due_date, t.priority, t.status,
           t.created_by, cu.name AS created_by_name,
           t.assigned_to, au.name AS assigned_to_name,
           t.created_at, t.updated_at
    FROM tasks t
    JOIN users cu ON cu.id = t.created_by
    JOIN users au ON au.id = t.assigned_to
"#;

impl Task {
    /// Builds a new task record with a fresh id and timestamps
    pub fn new(data: CreateTask) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            priority: data.priority,
            status: data.status,
            created_by: data.created_by,
            assigned_to: data.assigned_to,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new task
    ///
    /// # Errors
    ///
    /// Returns an error if the creator or assignee does not exist
    /// (foreign key violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let record = Task::new(data);

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, title, description, due_date, priority, status,
                               created_by, assigned_to, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, title, description, due_date, priority, status,
                      created_by, assigned_to, created_at, updated_at
            "#,
        )
        .bind(record.id)
        .bind(record.title)
        .bind(record.description)
        .bind(record.due_date)
        .bind(record.priority)
        .bind(record.status)
        .bind(record.created_by)
        .bind(record.assigned_to)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, priority, status,
                   created_by, assigned_to, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID with creator/assignee names resolved
    pub async fn find_details(pool: &PgPool, id: Uuid) -> Result<Option<TaskDetails>, sqlx::Error> {
        let query = format!("{} WHERE t.id = $1", DETAILS_SELECT);

        let row = sqlx::query_as::<_, TaskDetailsRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(TaskDetails::from))
    }

    /// Lists tasks the user created or is assigned to, newest first
    pub async fn list_details_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<TaskDetails>, sqlx::Error> {
        let query = format!(
            "{} WHERE t.created_by = $1 OR t.assigned_to = $1 ORDER BY t.created_at DESC",
            DETAILS_SELECT
        );

        let rows = sqlx::query_as::<_, TaskDetailsRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(TaskDetails::from).collect())
    }

    /// Applies a partial update
    ///
    /// Returns `None` if the task does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1 RETURNING id, title, description, due_date, priority, status, created_by, assigned_to, created_at, updated_at");

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Lenient `dueDate` parsing for request bodies
///
/// Accepts `null`, an empty string (treated as absent), a plain
/// `YYYY-MM-DD` date (midnight UTC, like an HTML date input) or an
/// RFC 3339 timestamp.
pub mod due_date {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use serde::{Deserialize, Deserializer};

    /// Parses a single non-empty due date value
    pub fn parse(value: &str) -> Result<DateTime<Utc>, String> {
        let value = value.trim();

        if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
            return Ok(ts.with_timezone(&Utc));
        }

        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| format!("Invalid due date: {}", value))?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| format!("Invalid due date: {}", value))?;

        Ok(Utc.from_utc_datetime(&midnight))
    }

    /// Serde adapter for `Option<DateTime<Utc>>` fields
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;

        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse(value).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

/// Lenient optional fields for request bodies
///
/// `null`, a missing key, or a blank string all mean "not provided";
/// anything else is trimmed and parsed with `FromStr`.
pub mod blank_as_none {
    use serde::{Deserialize, Deserializer};
    use std::{fmt::Display, str::FromStr};

    /// Serde adapter for `Option<T>` fields
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;

        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn summary(name: &str) -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    fn details(due_date: Option<DateTime<Utc>>, status: TaskStatus) -> TaskDetails {
        let creator = summary("Ada");
        let task = Task::new(CreateTask {
            title: "Write report".to_string(),
            description: String::new(),
            due_date,
            priority: TaskPriority::Medium,
            status,
            created_by: creator.id,
            assigned_to: creator.id,
        });
        TaskDetails::from_parts(task, creator.clone(), creator)
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), "In Progress");
        assert_eq!(
            serde_json::from_value::<TaskStatus>(serde_json::json!("Completed")).unwrap(),
            TaskStatus::Completed
        );
        assert!(serde_json::from_value::<TaskStatus>(serde_json::json!("Done")).is_err());
    }

    #[test]
    fn test_status_from_str_is_lenient() {
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("pending".parse::<TaskStatus>().unwrap(), TaskStatus::Pending);
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_priority_defaults_and_parsing() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!("HIGH".parse::<TaskPriority>().unwrap(), TaskPriority::High);
        assert!("urgent".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn test_overdue_past_due_pending() {
        let now = Utc::now();
        let task = details(Some(now - Duration::days(1)), TaskStatus::Pending);
        assert!(task.is_overdue(now));
    }

    #[test]
    fn test_completed_never_overdue() {
        let now = Utc::now();
        let task = details(Some(now - Duration::days(1)), TaskStatus::Completed);
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn test_future_or_undated_not_overdue() {
        let now = Utc::now();
        assert!(!details(Some(now + Duration::days(1)), TaskStatus::Pending).is_overdue(now));
        assert!(!details(None, TaskStatus::InProgress).is_overdue(now));
    }

    #[test]
    fn test_update_apply_leaves_absent_fields() {
        let creator = Uuid::new_v4();
        let mut task = Task::new(CreateTask {
            title: "Original".to_string(),
            description: "Keep me".to_string(),
            due_date: None,
            priority: TaskPriority::Low,
            status: TaskStatus::Pending,
            created_by: creator,
            assigned_to: creator,
        });

        let update = UpdateTask {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        assert!(!update.is_empty());
        update.apply_to(&mut task);

        assert_eq!(task.title, "Original");
        assert_eq!(task.description, "Keep me");
        assert_eq!(task.priority, TaskPriority::Low);
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.created_by, creator);
    }

    #[test]
    fn test_due_date_parse_formats() {
        let midnight = Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(due_date::parse("2025-01-05").unwrap(), midnight);
        assert_eq!(due_date::parse("2025-01-05T00:00:00Z").unwrap(), midnight);
        assert_eq!(due_date::parse("2025-01-05T02:00:00+02:00").unwrap(), midnight);
        assert!(due_date::parse("next tuesday").is_err());
    }

    #[test]
    fn test_due_date_deserialize_blank_is_none() {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default, deserialize_with = "due_date::deserialize")]
            due: Option<DateTime<Utc>>,
        }

        let body: Body = serde_json::from_str(r#"{"due": ""}"#).unwrap();
        assert!(body.due.is_none());
        let body: Body = serde_json::from_str(r#"{"due": null}"#).unwrap();
        assert!(body.due.is_none());
        let body: Body = serde_json::from_str(r#"{}"#).unwrap();
        assert!(body.due.is_none());
        let body: Body = serde_json::from_str(r#"{"due": "2025-03-01"}"#).unwrap();
        assert!(body.due.is_some());
    }

    #[test]
    fn test_blank_as_none() {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default, deserialize_with = "blank_as_none::deserialize")]
            title: Option<String>,
            #[serde(default, deserialize_with = "blank_as_none::deserialize")]
            status: Option<TaskStatus>,
        }

        let body: Body = serde_json::from_str(r#"{"title": "  ", "status": ""}"#).unwrap();
        assert!(body.title.is_none());
        assert!(body.status.is_none());

        let body: Body = serde_json::from_str(r#"{"title": " Plan ", "status": "In Progress"}"#).unwrap();
        assert_eq!(body.title.as_deref(), Some("Plan"));
        assert_eq!(body.status, Some(TaskStatus::InProgress));

        assert!(serde_json::from_str::<Body>(r#"{"status": "Done"}"#).is_err());
    }

    #[test]
    fn test_details_wire_shape() {
        let task = details(None, TaskStatus::InProgress);
        let json = serde_json::to_value(&task).unwrap();

        assert!(json["_id"].is_string());
        assert_eq!(json["status"], "In Progress");
        assert_eq!(json["createdBy"]["name"], "Ada");
        assert!(json["assignedTo"]["_id"].is_string());
        assert!(json["dueDate"].is_null());
    }
}

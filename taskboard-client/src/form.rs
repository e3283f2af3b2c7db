/// Task form and signup form state
///
/// The task form starts at Medium / Pending, can be prefilled from an
/// existing task for editing, validates before anything is sent, and
/// produces the notification shown after a save.

use chrono::NaiveDate;
use taskboard_shared::{
    auth::password::validate_password_length,
    models::task::{TaskDetails, TaskPriority, TaskStatus},
};
use uuid::Uuid;

use crate::api::TaskPayload;

/// Client-side validation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Task title is required")]
    MissingTitle,

    #[error("Please assign the task to a user")]
    MissingAssignee,

    #[error("Name is required")]
    MissingName,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("{0}")]
    InvalidPassword(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assigned_to: Option<Uuid>,
    editing: Option<Uuid>,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: None,
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            assigned_to: None,
            editing: None,
        }
    }
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form prefilled from a fetched task, in edit mode
    pub fn edit(task: &TaskDetails) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date.map(|d| d.date_naive()),
            priority: task.priority,
            status: task.status,
            assigned_to: Some(task.assigned_to.id),
            editing: Some(task.id),
        }
    }

    /// Task being edited, `None` when creating
    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::MissingTitle);
        }
        if self.assigned_to.is_none() {
            return Err(FormError::MissingAssignee);
        }
        Ok(())
    }

    /// Validated request body
    pub fn payload(&self) -> Result<TaskPayload, FormError> {
        self.validate()?;

        Ok(TaskPayload {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description.clone()),
            due_date: self.due_date,
            priority: Some(self.priority),
            status: Some(self.status),
            assigned_to: self.assigned_to,
        })
    }

    /// Notification text for a successful save
    pub fn notification(&self, saved: &TaskDetails, me: Uuid) -> String {
        if self.editing.is_some() {
            return format!("Task \"{}\" updated", saved.title);
        }

        let you = if saved.assigned_to.id == me { " (You)" } else { "" };
        format!(
            "Task \"{}\" assigned to {}{}",
            saved.title, saved.assigned_to.name, you
        )
    }

    /// Back to a blank create form
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Checks signup fields before they are sent
pub fn validate_signup(name: &str, email: &str, password: &str) -> Result<(), FormError> {
    if name.trim().is_empty() {
        return Err(FormError::MissingName);
    }

    let email = email.trim();
    let well_formed = email
        .split_once('@')
        .map_or(false, |(local, domain)| !local.is_empty() && domain.contains('.'));
    if !well_formed {
        return Err(FormError::InvalidEmail);
    }

    validate_password_length(password).map_err(FormError::InvalidPassword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use taskboard_shared::models::user::UserSummary;

    fn saved(title: &str, assignee: &UserSummary, creator: &UserSummary) -> TaskDetails {
        let now = Utc::now();
        TaskDetails {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: "Quarterly numbers".to_string(),
            due_date: Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()),
            priority: TaskPriority::High,
            status: TaskStatus::InProgress,
            created_by: creator.clone(),
            assigned_to: assignee.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn user(name: &str) -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_defaults() {
        let form = TaskForm::new();
        assert_eq!(form.priority, TaskPriority::Medium);
        assert_eq!(form.status, TaskStatus::Pending);
        assert!(form.editing().is_none());
    }

    #[test]
    fn test_validation_messages() {
        let mut form = TaskForm::new();
        assert_eq!(form.validate().unwrap_err().to_string(), "Task title is required");

        form.title = "Write report".to_string();
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "Please assign the task to a user"
        );

        form.assigned_to = Some(Uuid::new_v4());
        assert!(form.payload().is_ok());
    }

    #[test]
    fn test_edit_prefills_from_task() {
        let (ada, bob) = (user("Ada"), user("Bob"));
        let task = saved("Write report", &bob, &ada);
        let form = TaskForm::edit(&task);

        assert_eq!(form.editing(), Some(task.id));
        assert_eq!(form.title, "Write report");
        assert_eq!(form.due_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(form.priority, TaskPriority::High);
        assert_eq!(form.status, TaskStatus::InProgress);
        assert_eq!(form.assigned_to, Some(bob.id));
    }

    #[test]
    fn test_notifications() {
        let (ada, bob) = (user("Ada"), user("Bob"));

        let mut form = TaskForm::new();
        assert_eq!(
            form.notification(&saved("Write report", &bob, &ada), ada.id),
            "Task \"Write report\" assigned to Bob"
        );
        assert_eq!(
            form.notification(&saved("Write report", &ada, &ada), ada.id),
            "Task \"Write report\" assigned to Ada (You)"
        );

        form = TaskForm::edit(&saved("Write report", &bob, &ada));
        assert_eq!(
            form.notification(&saved("Write report v2", &bob, &ada), ada.id),
            "Task \"Write report v2\" updated"
        );

        form.reset();
        assert_eq!(form, TaskForm::default());
    }

    #[test]
    fn test_validate_signup() {
        assert!(validate_signup("Ada", "ada@example.com", "correct horse").is_ok());
        assert_eq!(
            validate_signup(" ", "ada@example.com", "correct horse"),
            Err(FormError::MissingName)
        );
        assert_eq!(
            validate_signup("Ada", "ada.example.com", "correct horse"),
            Err(FormError::InvalidEmail)
        );
        assert!(matches!(
            validate_signup("Ada", "ada@example.com", "short"),
            Err(FormError::InvalidPassword(_))
        ));
    }
}

/// Dashboard state
///
/// Holds the caller's full task list as fetched from the API plus the
/// active filter. Any change to either recomputes the filtered list and
/// the three views shown on the dashboard.
///
/// # Example
///
/// ```
/// use taskboard_client::dashboard::{DashboardState, TaskFilter};
/// use taskboard_shared::models::task::TaskStatus;
/// use uuid::Uuid;
///
/// let mut dashboard = DashboardState::new(Uuid::new_v4());
/// dashboard.set_filter(TaskFilter {
///     status: Some(TaskStatus::Pending),
///     ..Default::default()
/// });
/// assert!(dashboard.filtered().is_empty());
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use taskboard_shared::models::task::{TaskDetails, TaskPriority, TaskStatus};
use uuid::Uuid;

/// Dashboard filter; empty fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of title or description
    pub search: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Inclusive; tasks without a due date never match a date range
    pub due_date_start: Option<NaiveDate>,
    pub due_date_end: Option<NaiveDate>,
}

impl TaskFilter {
    pub fn matches(&self, task: &TaskDetails) -> bool {
        self.matches_search(task)
            && self.status.map_or(true, |status| task.status == status)
            && self.priority.map_or(true, |priority| task.priority == priority)
            && self.matches_due_date(task)
    }

    fn matches_search(&self, task: &TaskDetails) -> bool {
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || task.title.to_lowercase().contains(&needle)
            || task.description.to_lowercase().contains(&needle)
    }

    fn matches_due_date(&self, task: &TaskDetails) -> bool {
        if self.due_date_start.is_none() && self.due_date_end.is_none() {
            return true;
        }

        let Some(due) = task.due_date.map(|d| d.date_naive()) else {
            return false;
        };

        self.due_date_start.map_or(true, |start| due >= start)
            && self.due_date_end.map_or(true, |end| due <= end)
    }
}

/// Derived views over the filtered list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardViews {
    pub created_by_me: Vec<TaskDetails>,
    pub assigned_to_me: Vec<TaskDetails>,
    pub overdue: Vec<TaskDetails>,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    user_id: Uuid,
    tasks: Vec<TaskDetails>,
    filter: TaskFilter,
    filtered: Vec<TaskDetails>,
    views: DashboardViews,
}

impl DashboardState {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            tasks: Vec::new(),
            filter: TaskFilter::default(),
            filtered: Vec::new(),
            views: DashboardViews::default(),
        }
    }

    /// Replaces the task list after a refetch
    pub fn set_tasks(&mut self, tasks: Vec<TaskDetails>) {
        self.tasks = tasks;
        self.recompute_at(Utc::now());
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
        self.recompute_at(Utc::now());
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
        self.recompute_at(Utc::now());
    }

    /// Rebuilds the filtered list and views against an explicit clock
    pub fn recompute_at(&mut self, now: DateTime<Utc>) {
        self.filtered = self
            .tasks
            .iter()
            .filter(|task| self.filter.matches(task))
            .cloned()
            .collect();

        let mine = |id: Uuid| id == self.user_id;
        self.views = DashboardViews {
            created_by_me: self
                .filtered
                .iter()
                .filter(|t| mine(t.created_by.id))
                .cloned()
                .collect(),
            assigned_to_me: self
                .filtered
                .iter()
                .filter(|t| mine(t.assigned_to.id))
                .cloned()
                .collect(),
            overdue: self
                .filtered
                .iter()
                .filter(|t| t.is_overdue(now))
                .cloned()
                .collect(),
        };
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn tasks(&self) -> &[TaskDetails] {
        &self.tasks
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    pub fn filtered(&self) -> &[TaskDetails] {
        &self.filtered
    }

    pub fn views(&self) -> &DashboardViews {
        &self.views
    }

    /// Assigned-to-me task with the latest `createdAt`, for the notification bell
    pub fn newest_assigned(&self) -> Option<&TaskDetails> {
        self.views
            .assigned_to_me
            .iter()
            .max_by_key(|task| task.created_at)
    }
}

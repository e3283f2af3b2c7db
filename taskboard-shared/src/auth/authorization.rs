/// Authorization helpers and permission checks
///
/// Task permissions are decided purely by identity:
///
/// | caller is | read | update | delete |
/// |-----------|------|--------|--------|
/// | creator   | yes  | yes    | yes    |
/// | assignee  | yes  | yes    | no     |
/// | anyone    | no   | no     | no     |
///
/// A user who is both creator and assignee is treated as the creator.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::authorization::{can_modify, require_delete, Capability};
/// use taskboard_shared::models::task::{CreateTask, Task};
/// use uuid::Uuid;
///
/// let (ada, bob) = (Uuid::new_v4(), Uuid::new_v4());
/// let task = Task::new(CreateTask {
///     title: "Write report".to_string(),
///     description: String::new(),
///     due_date: None,
///     priority: Default::default(),
///     status: Default::default(),
///     created_by: ada,
///     assigned_to: bob,
/// });
///
/// assert_eq!(can_modify(&task, bob), Capability::Assignee);
/// assert!(require_delete(&task, bob).is_err());
/// ```

use uuid::Uuid;

use crate::models::task::{Task, TaskDetails};

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller is neither creator nor assignee
    #[error("Not authorized to view this task")]
    CannotView,

    /// Caller is neither creator nor assignee
    #[error("Not authorized to edit this task")]
    CannotEdit,

    /// Caller is not the creator
    #[error("Not authorized to delete this task")]
    CannotDelete,
}

/// What the caller may do with a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Created the task: may read, update, delete
    Owner,

    /// Assigned to the task: may read and update
    Assignee,

    /// No relation to the task
    None,
}

impl Capability {
    pub fn can_update(&self) -> bool {
        !matches!(self, Capability::None)
    }

    pub fn can_delete(&self) -> bool {
        matches!(self, Capability::Owner)
    }
}

/// Anything that records a task's creator and assignee
pub trait TaskParticipants {
    fn creator_id(&self) -> Uuid;
    fn assignee_id(&self) -> Uuid;
}

impl TaskParticipants for Task {
    fn creator_id(&self) -> Uuid {
        self.created_by
    }

    fn assignee_id(&self) -> Uuid {
        self.assigned_to
    }
}

impl TaskParticipants for TaskDetails {
    fn creator_id(&self) -> Uuid {
        self.created_by.id
    }

    fn assignee_id(&self) -> Uuid {
        self.assigned_to.id
    }
}

/// Determines the caller's capability over `task`
pub fn can_modify<T: TaskParticipants + ?Sized>(task: &T, caller: Uuid) -> Capability {
    if task.creator_id() == caller {
        Capability::Owner
    } else if task.assignee_id() == caller {
        Capability::Assignee
    } else {
        Capability::None
    }
}

/// Requires the caller to be creator or assignee to read the task
pub fn require_view<T: TaskParticipants + ?Sized>(
    task: &T,
    caller: Uuid,
) -> Result<Capability, AuthzError> {
    require_modify(task, caller).map_err(|_| AuthzError::CannotView)
}

/// Requires the caller to be creator or assignee
pub fn require_modify<T: TaskParticipants + ?Sized>(
    task: &T,
    caller: Uuid,
) -> Result<Capability, AuthzError> {
    let capability = can_modify(task, caller);
    if capability.can_update() {
        Ok(capability)
    } else {
        Err(AuthzError::CannotEdit)
    }
}

/// Requires the caller to be the creator
pub fn require_delete<T: TaskParticipants + ?Sized>(task: &T, caller: Uuid) -> Result<(), AuthzError> {
    if can_modify(task, caller).can_delete() {
        Ok(())
    } else {
        Err(AuthzError::CannotDelete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::CreateTask;

    fn task(created_by: Uuid, assigned_to: Uuid) -> Task {
        Task::new(CreateTask {
            title: "Write report".to_string(),
            description: String::new(),
            due_date: None,
            priority: Default::default(),
            status: Default::default(),
            created_by,
            assigned_to,
        })
    }

    #[test]
    fn test_capabilities() {
        let (ada, bob, eve) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let task = task(ada, bob);

        assert_eq!(can_modify(&task, ada), Capability::Owner);
        assert_eq!(can_modify(&task, bob), Capability::Assignee);
        assert_eq!(can_modify(&task, eve), Capability::None);
    }

    #[test]
    fn test_self_assigned_is_owner() {
        let ada = Uuid::new_v4();
        assert_eq!(can_modify(&task(ada, ada), ada), Capability::Owner);
    }

    #[test]
    fn test_require_modify() {
        let (ada, bob, eve) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let task = task(ada, bob);

        assert_eq!(require_modify(&task, ada), Ok(Capability::Owner));
        assert_eq!(require_modify(&task, bob), Ok(Capability::Assignee));
        assert_eq!(require_modify(&task, eve), Err(AuthzError::CannotEdit));
        assert_eq!(require_view(&task, eve), Err(AuthzError::CannotView));
    }

    #[test]
    fn test_require_delete() {
        let (ada, bob, eve) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let task = task(ada, bob);

        assert!(require_delete(&task, ada).is_ok());
        assert_eq!(require_delete(&task, bob), Err(AuthzError::CannotDelete));
        assert_eq!(require_delete(&task, eve), Err(AuthzError::CannotDelete));
    }

    #[test]
    fn test_authz_error_display() {
        assert_eq!(
            AuthzError::CannotEdit.to_string(),
            "Not authorized to edit this task"
        );
        assert_eq!(
            AuthzError::CannotDelete.to_string(),
            "Not authorized to delete this task"
        );
    }
}

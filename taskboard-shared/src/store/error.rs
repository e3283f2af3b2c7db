//! Store error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Unique constraint violated (e.g. duplicate email).
    #[error("{entity_type} already exists: {key}")]
    AlreadyExists {
        entity_type: &'static str,
        key: String,
    },

    /// A referenced record does not exist.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    /// Creates a not found error.
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an already exists error.
    pub fn already_exists(entity_type: &'static str, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity_type,
            key: key.into(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // SQLSTATE 23505 unique_violation, 23503 foreign_key_violation
            match db_err.code().as_deref() {
                Some("23505") => {
                    let constraint = db_err.constraint().unwrap_or("unique").to_string();
                    let entity_type = if constraint.starts_with("users") { "User" } else { "Record" };
                    return StoreError::already_exists(entity_type, constraint);
                }
                Some("23503") => {
                    let constraint = db_err.constraint().unwrap_or("foreign key").to_string();
                    return StoreError::InvalidReference(constraint);
                }
                _ => {}
            }
        }

        StoreError::Database(err)
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            StoreError::not_found("Task", "abc").to_string(),
            "Task not found: abc"
        );
        assert_eq!(
            StoreError::already_exists("User", "ada@example.com").to_string(),
            "User already exists: ada@example.com"
        );
    }

    #[test]
    fn test_row_not_found_is_database_error() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Database(_)));
    }
}

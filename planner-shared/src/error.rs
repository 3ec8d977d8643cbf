/// Typed results for store operations
///
/// Every model function returns `Result<T, StoreError>`. Callers can tell a
/// missing row from a rejected write from an unreachable database, and only
/// `TransientIo` is worth retrying.
///
/// # Example
///
/// ```no_run
/// use planner_shared::error::StoreError;
/// use planner_shared::models::board::Board;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, board_id: Uuid) {
/// match Board::find_by_id(&pool, board_id).await {
///     Ok(board) => println!("{}", board.title),
///     Err(StoreError::NotFound { .. }) => println!("board is gone"),
///     Err(e) if e.is_retryable() => println!("try again later: {}", e),
///     Err(e) => println!("failed: {}", e),
/// }
/// # }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::password::PasswordError;

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The addressed row does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The write conflicts with existing state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input rejected before reaching the database
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// Connectivity problem; the operation may succeed if retried
    #[error("Database unavailable: {0}")]
    TransientIo(#[source] sqlx::Error),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Password hashing failed or a stored hash is unusable
    #[error(transparent)]
    Credentials(#[from] PasswordError),
}

impl StoreError {
    /// Builds a `NotFound` for a UUID-keyed entity
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Builds a single-field `Validation` error
    pub fn invalid(field: &str, message: &str) -> Self {
        StoreError::Validation(vec![FieldError::new(field, message)])
    }

    /// True if retrying the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::TransientIo(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "row",
                id: String::new(),
            },
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => StoreError::TransientIo(err),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.into_owned());
                match code.as_deref() {
                    Some(UNIQUE_VIOLATION) => {
                        let constraint = db_err.constraint().unwrap_or("unique constraint");
                        StoreError::Conflict(format!("{} already taken", constraint))
                    }
                    Some(FOREIGN_KEY_VIOLATION) => {
                        StoreError::Conflict("referenced row does not exist".to_string())
                    }
                    _ => StoreError::Database(sqlx::Error::Database(db_err)),
                }
            }
            other => StoreError::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let id = Uuid::nil();
        let err = StoreError::not_found("Board", id);
        assert_eq!(
            err.to_string(),
            "Board 00000000-0000-0000-0000-000000000000 not found"
        );
    }

    #[test]
    fn test_validation_display() {
        let err = StoreError::Validation(vec![
            FieldError::new("email", "Invalid email format"),
            FieldError::new("password", "Password too short"),
        ]);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::from(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(StoreError::from(sqlx::Error::PoolClosed).is_retryable());

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(StoreError::from(sqlx::Error::Io(io)).is_retryable());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_protocol_error_is_not_retryable() {
        let err = StoreError::from(sqlx::Error::Protocol("bad frame".into()));
        assert!(matches!(err, StoreError::Database(_)));
        assert!(!err.is_retryable());
    }
}

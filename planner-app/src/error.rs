/// Error type shared by the services and views
///
/// Store errors are folded into a smaller set of kinds a view can act on:
/// show a form error, show "not found", offer a retry, or give up.
///
/// # Example
///
/// ```no_run
/// use planner_app::error::{AppError, AppResult};
/// use planner_shared::models::board::Board;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// async fn board_title(pool: &PgPool, id: Uuid) -> AppResult<String> {
///     let board = Board::find_by_id(pool, id).await?;
///     Ok(board.title)
/// }
/// ```

use planner_shared::auth::password::PasswordError;
use planner_shared::error::{FieldError, StoreError};

use crate::chat::ChatError;

/// App result type alias
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// The user is not allowed to perform the action
    #[error("{0}")]
    Forbidden(String),

    /// Database unreachable or too slow; the action may be retried
    #[error("Service temporarily unavailable: {0}")]
    TransientIo(String),

    #[error("Internal error: {0}")]
    Fatal(String),

    /// The view that started the action is gone
    #[error("Cancelled")]
    Cancelled,

    #[error(transparent)]
    Chat(#[from] ChatError),
}

impl AppError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::TransientIo(_))
    }

    /// Field errors to show next to form inputs
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AppError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::NotFound(err.to_string()),
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Validation(errors) => AppError::Validation(errors),
            StoreError::TransientIo(e) => {
                tracing::warn!(error = %e, "Database unavailable");
                AppError::TransientIo(e.to_string())
            }
            StoreError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                AppError::Fatal("database error".to_string())
            }
            StoreError::Credentials(e) => AppError::from(e),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        tracing::error!(error = %err, "Password processing failed");
        AppError::Fatal("credential processing failed".to_string())
    }
}

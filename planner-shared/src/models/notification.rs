/// In-app notifications
///
/// Notifications are plain messages addressed to one user. They are written
/// as a side effect of membership changes, inside the same transaction, so
/// `create` takes a connection rather than the pool.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE notifications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     message TEXT NOT NULL,
///     is_read BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Inserts an unread notification
    ///
    /// Runs on the caller's connection so it commits or rolls back together
    /// with the change that caused it.
    pub async fn create(
        conn: &mut PgConnection,
        user_id: Uuid,
        message: &str,
    ) -> StoreResult<Self> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, message)
            VALUES ($1, $2)
            RETURNING id, user_id, message, is_read, created_at
            "#,
        )
        .bind(user_id)
        .bind(message)
        .fetch_one(conn)
        .await?;

        debug!(notification_id = %notification.id, user_id = %user_id, "Notification created");
        Ok(notification)
    }

    /// Unread notifications, newest first
    pub async fn unread_for(pool: &PgPool, user_id: Uuid) -> StoreResult<Vec<Self>> {
        Self::list(pool, user_id, false).await
    }

    /// Read notifications, newest first
    pub async fn read_for(pool: &PgPool, user_id: Uuid) -> StoreResult<Vec<Self>> {
        Self::list(pool, user_id, true).await
    }

    async fn list(pool: &PgPool, user_id: Uuid, is_read: bool) -> StoreResult<Vec<Self>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, message, is_read, created_at
            FROM notifications
            WHERE user_id = $1 AND is_read = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(is_read)
        .fetch_all(pool)
        .await?;

        Ok(notifications)
    }

    pub async fn unread_count(pool: &PgPool, user_id: Uuid) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Marks one of the user's notifications as read
    ///
    /// Marking an already-read notification is a no-op.
    ///
    /// # Errors
    ///
    /// `NotFound` if the notification does not exist or belongs to someone else
    pub async fn mark_read(pool: &PgPool, user_id: Uuid, id: Uuid) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Notification", id));
        }

        Ok(())
    }

    /// Marks every unread notification of the user as read, returns how many
    /// changed
    pub async fn mark_all_read(pool: &PgPool, user_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        debug!(user_id = %user_id, count = result.rows_affected(), "Notifications marked read");
        Ok(result.rows_affected())
    }
}

/// Board model and database operations
///
/// A board has one owner (`user_id`) and any number of members through
/// `board_members`. Deleting a board removes its lists, cards, memberships
/// and invitations via `ON DELETE CASCADE`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use planner_shared::models::board::Board;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let board = Board::create(&pool, "Trip", "Packing and tickets", owner_id).await?;
///
/// for b in Board::list_for_user(&pool, owner_id).await? {
///     println!("{} ({})", b.title, b.created_at);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::user::User;

/// Kanban board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    pub id: Uuid,

    pub title: String,

    pub description: String,

    /// Owner of the board
    pub user_id: Uuid,

    pub created_at: DateTime<Utc>,
}

impl Board {
    /// Creates a board owned by `owner_id`
    ///
    /// Id and creation timestamp are assigned by the database.
    ///
    /// # Errors
    ///
    /// - `Validation` if the title is blank
    /// - `Conflict` if the owner does not exist
    pub async fn create(
        pool: &PgPool,
        title: &str,
        description: &str,
        owner_id: Uuid,
    ) -> StoreResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::invalid("title", "Board title is required"));
        }

        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (title, description, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, user_id, created_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        info!(board_id = %board.id, owner_id = %owner_id, "Board created");
        Ok(board)
    }

    /// Loads a board by id
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> StoreResult<Self> {
        sqlx::query_as::<_, Board>(
            "SELECT id, title, description, user_id, created_at FROM boards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Board", id))
    }

    /// Boards owned by the user plus boards the user is a member of,
    /// newest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> StoreResult<Vec<Self>> {
        let boards = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, title, description, user_id, created_at
            FROM boards
            WHERE user_id = $1
            UNION
            SELECT b.id, b.title, b.description, b.user_id, b.created_at
            FROM boards b
            JOIN board_members bm ON b.id = bm.board_id
            WHERE bm.user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        debug!(user_id = %user_id, count = boards.len(), "Listed boards");
        Ok(boards)
    }

    /// Changes title and description
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        title: &str,
        description: &str,
    ) -> StoreResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::invalid("title", "Board title is required"));
        }

        let board = sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards SET title = $2, description = $3
            WHERE id = $1
            RETURNING id, title, description, user_id, created_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Board", id))?;

        info!(board_id = %id, "Board updated");
        Ok(board)
    }

    /// Deletes a board together with its lists, cards, memberships and
    /// invitations
    pub async fn delete(pool: &PgPool, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Board", id));
        }

        info!(board_id = %id, "Board deleted");
        Ok(())
    }

    /// Owner id of a board, `None` if the board does not exist
    pub async fn owner_id(conn: &mut PgConnection, id: Uuid) -> StoreResult<Option<Uuid>> {
        let owner = sqlx::query_scalar("SELECT user_id FROM boards WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(owner)
    }

    /// Title of a board, `None` if the board does not exist
    pub async fn title(conn: &mut PgConnection, id: Uuid) -> StoreResult<Option<String>> {
        let title = sqlx::query_scalar("SELECT title FROM boards WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(title)
    }

    /// Non-owner members of a board, in the order they joined
    pub async fn members(pool: &PgPool, id: Uuid) -> StoreResult<Vec<User>> {
        let members = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.phone, u.first_name, u.last_name,
                   u.birthday, u.avatar_path, u.password_hash, u.created_at
            FROM users u
            JOIN board_members bm ON u.id = bm.user_id
            WHERE bm.board_id = $1
            ORDER BY bm.created_at ASC
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }
}

/// Kanban lists (board columns)
///
/// Lists keep creation order through the `seq` column; ids are random UUIDs
/// and carry no order. The color tag is stored as nullable text where NULL
/// means no color.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Color tag of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListColor {
    Red,
    Yellow,
    Green,
    #[default]
    None,
}

impl ListColor {
    /// Column value; `None` is stored as NULL
    pub fn as_db(&self) -> Option<&'static str> {
        match self {
            ListColor::Red => Some("red"),
            ListColor::Yellow => Some("yellow"),
            ListColor::Green => Some("green"),
            ListColor::None => None,
        }
    }

    fn from_db(value: Option<&str>) -> Self {
        // Unknown values cannot pass the CHECK constraint; treat them as untagged
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for ListColor {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(ListColor::Red),
            "yellow" => Ok(ListColor::Yellow),
            "green" => Ok(ListColor::Green),
            "none" | "" => Ok(ListColor::None),
            other => Err(StoreError::invalid(
                "color",
                &format!("unknown list color '{}'", other),
            )),
        }
    }
}

/// Kanban list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardList {
    pub id: Uuid,
    pub title: String,
    pub board_id: Uuid,
    pub color: ListColor,
}

#[derive(sqlx::FromRow)]
struct ListRow {
    id: Uuid,
    title: String,
    board_id: Uuid,
    color: Option<String>,
}

impl From<ListRow> for BoardList {
    fn from(row: ListRow) -> Self {
        BoardList {
            id: row.id,
            title: row.title,
            board_id: row.board_id,
            color: ListColor::from_db(row.color.as_deref()),
        }
    }
}

impl BoardList {
    /// Appends an untagged list to a board
    pub async fn create(pool: &PgPool, title: &str, board_id: Uuid) -> StoreResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::invalid("title", "List title is required"));
        }

        let row = sqlx::query_as::<_, ListRow>(
            r#"
            INSERT INTO lists (title, board_id)
            VALUES ($1, $2)
            RETURNING id, title, board_id, color
            "#,
        )
        .bind(title)
        .bind(board_id)
        .fetch_one(pool)
        .await?;

        info!(list_id = %row.id, board_id = %board_id, "List created");
        Ok(row.into())
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> StoreResult<Self> {
        sqlx::query_as::<_, ListRow>("SELECT id, title, board_id, color FROM lists WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| StoreError::not_found("List", id))
    }

    /// Lists of a board in creation order
    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> StoreResult<Vec<Self>> {
        let rows = sqlx::query_as::<_, ListRow>(
            "SELECT id, title, board_id, color FROM lists WHERE board_id = $1 ORDER BY seq ASC",
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        debug!(board_id = %board_id, count = rows.len(), "Listed board lists");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Renames a list and sets its color tag
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        title: &str,
        color: ListColor,
    ) -> StoreResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::invalid("title", "List title is required"));
        }

        let row = sqlx::query_as::<_, ListRow>(
            r#"
            UPDATE lists SET title = $2, color = $3
            WHERE id = $1
            RETURNING id, title, board_id, color
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(color.as_db())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("List", id))?;

        info!(list_id = %id, color = ?color, "List updated");
        Ok(row.into())
    }

    /// Deletes a list and its cards
    pub async fn delete(pool: &PgPool, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("List", id));
        }

        info!(list_id = %id, "List deleted");
        Ok(())
    }
}

/// Kanban cards
///
/// A card belongs to exactly one list. `position` orders cards within their
/// list; new and moved cards go to the end (max + 1). Ties are broken by
/// creation order.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE cards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     seq BIGSERIAL NOT NULL,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     list_id UUID NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
///     card_order INTEGER NOT NULL DEFAULT 0
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub list_id: Uuid,

    /// Order within the list, ascending
    #[sqlx(rename = "card_order")]
    pub position: i32,
}

impl Card {
    /// Appends a card to the end of a list
    pub async fn create(
        pool: &PgPool,
        title: &str,
        description: &str,
        list_id: Uuid,
    ) -> StoreResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::invalid("title", "Card title is required"));
        }

        let card = sqlx::query_as::<_, Card>(
            r#"
            INSERT INTO cards (title, description, list_id, card_order)
            VALUES (
                $1, $2, $3,
                (SELECT COALESCE(MAX(card_order), 0) + 1 FROM cards WHERE list_id = $3)
            )
            RETURNING id, title, description, list_id, card_order
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(list_id)
        .fetch_one(pool)
        .await?;

        info!(card_id = %card.id, list_id = %list_id, position = card.position, "Card created");
        Ok(card)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> StoreResult<Self> {
        sqlx::query_as::<_, Card>(
            "SELECT id, title, description, list_id, card_order FROM cards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Card", id))
    }

    /// Cards of a list in display order
    pub async fn list_by_list(pool: &PgPool, list_id: Uuid) -> StoreResult<Vec<Self>> {
        let cards = sqlx::query_as::<_, Card>(
            r#"
            SELECT id, title, description, list_id, card_order
            FROM cards
            WHERE list_id = $1
            ORDER BY card_order ASC, seq ASC
            "#,
        )
        .bind(list_id)
        .fetch_all(pool)
        .await?;

        debug!(list_id = %list_id, count = cards.len(), "Listed cards");
        Ok(cards)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        title: &str,
        description: &str,
    ) -> StoreResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::invalid("title", "Card title is required"));
        }

        let card = sqlx::query_as::<_, Card>(
            r#"
            UPDATE cards SET title = $2, description = $3
            WHERE id = $1
            RETURNING id, title, description, list_id, card_order
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Card", id))?;

        info!(card_id = %id, "Card updated");
        Ok(card)
    }

    /// Moves a card to the end of another list on the same board
    ///
    /// Dropping a card on the list it is already in leaves it where it is;
    /// order within a list changes only through `set_position`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the card or the target list does not exist
    /// - `Conflict` if the target list is on a different board
    pub async fn move_to_list(pool: &PgPool, id: Uuid, new_list_id: Uuid) -> StoreResult<Self> {
        let mut tx = pool.begin().await?;

        let boards: Option<(Uuid, Uuid, Option<Uuid>)> = sqlx::query_as(
            r#"
            SELECT c.list_id, src.board_id, (SELECT board_id FROM lists WHERE id = $2)
            FROM cards c
            JOIN lists src ON c.list_id = src.id
            WHERE c.id = $1
            FOR UPDATE OF c
            "#,
        )
        .bind(id)
        .bind(new_list_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (source_list, source_board, target_board) =
            boards.ok_or_else(|| StoreError::not_found("Card", id))?;

        if source_list == new_list_id {
            let card = sqlx::query_as::<_, Card>(
                "SELECT id, title, description, list_id, card_order FROM cards WHERE id = $1",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            tx.commit().await?;

            debug!(card_id = %id, list_id = %new_list_id, "Card dropped on its own list");
            return Ok(card);
        }

        let target_board = target_board.ok_or_else(|| StoreError::not_found("List", new_list_id))?;

        if source_board != target_board {
            return Err(StoreError::Conflict(
                "cannot move a card to a list on another board".to_string(),
            ));
        }

        let card = sqlx::query_as::<_, Card>(
            r#"
            UPDATE cards
            SET list_id = $2,
                card_order = (SELECT COALESCE(MAX(card_order), 0) + 1 FROM cards WHERE list_id = $2)
            WHERE id = $1
            RETURNING id, title, description, list_id, card_order
            "#,
        )
        .bind(id)
        .bind(new_list_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(card_id = %id, list_id = %new_list_id, position = card.position, "Card moved");
        Ok(card)
    }

    /// Sets the order of a card within its list
    pub async fn set_position(pool: &PgPool, id: Uuid, position: i32) -> StoreResult<Self> {
        let card = sqlx::query_as::<_, Card>(
            r#"
            UPDATE cards SET card_order = $2
            WHERE id = $1
            RETURNING id, title, description, list_id, card_order
            "#,
        )
        .bind(id)
        .bind(position)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Card", id))?;

        debug!(card_id = %id, position, "Card repositioned");
        Ok(card)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Card", id));
        }

        info!(card_id = %id, "Card deleted");
        Ok(())
    }
}

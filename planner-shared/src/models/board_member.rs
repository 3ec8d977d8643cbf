/// Board membership
///
/// A membership row grants a non-owner user access to a board. Rows are
/// created by accepting an invitation and removed either by the owner
/// (`remove`) or by the member (`leave`). Both removals notify the other
/// party in the same transaction.

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::board::Board;
use crate::models::notification::Notification;

/// Namespace for membership queries
pub struct BoardMember;

/// Message sent to a user removed by the owner
pub fn removed_message(board_title: &str) -> String {
    format!("You were removed from the board \"{}\".", board_title)
}

/// Message sent to the owner when a member leaves
pub fn left_message(member_name: &str, board_title: &str) -> String {
    format!("Member {} left your board \"{}\".", member_name, board_title)
}

impl BoardMember {
    /// True if the user has a membership row on the board (owners do not)
    pub async fn is_member(pool: &PgPool, board_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM board_members WHERE board_id = $1 AND user_id = $2)",
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Removes a member and notifies them
    ///
    /// Deleting the membership and inserting the notification commit
    /// together.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user was not a member of the board
    pub async fn remove(pool: &PgPool, board_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM board_members WHERE board_id = $1 AND user_id = $2")
            .bind(board_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "Membership",
                id: format!("{}/{}", board_id, user_id),
            });
        }

        let title = Board::title(&mut tx, board_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Board", board_id))?;

        Notification::create(&mut tx, user_id, &removed_message(&title)).await?;

        tx.commit().await?;

        info!(board_id = %board_id, user_id = %user_id, "Member removed from board");
        Ok(())
    }

    /// Removes the caller's own membership and notifies the owner
    ///
    /// If the board has no owner row the membership is still removed and no
    /// notification is written.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user was not a member of the board
    pub async fn leave(
        pool: &PgPool,
        board_id: Uuid,
        user_id: Uuid,
        display_name: &str,
    ) -> StoreResult<()> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM board_members WHERE board_id = $1 AND user_id = $2")
            .bind(board_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "Membership",
                id: format!("{}/{}", board_id, user_id),
            });
        }

        match Board::owner_id(&mut tx, board_id).await? {
            Some(owner_id) => {
                let title = Board::title(&mut tx, board_id).await?.unwrap_or_default();
                Notification::create(&mut tx, owner_id, &left_message(display_name, &title))
                    .await?;
            }
            None => warn!(board_id = %board_id, "Board has no owner, skipping leave notification"),
        }

        tx.commit().await?;

        info!(board_id = %board_id, user_id = %user_id, "Member left board");
        Ok(())
    }
}

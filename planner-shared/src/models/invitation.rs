/// Board invitations
///
/// One invitation row exists per (receiver, board). Its status moves
/// PENDING → ACCEPTED or PENDING → DECLINED; sending again resets any status
/// to PENDING with a fresh timestamp. Accepting creates the membership in
/// the same transaction as the status change.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE invitation_status AS ENUM ('PENDING', 'ACCEPTED', 'DECLINED');
///
/// CREATE TABLE invitations (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     sender_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     receiver_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     status invitation_status NOT NULL DEFAULT 'PENDING',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT invitations_receiver_board_key UNIQUE (receiver_id, board_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use planner_shared::models::invitation::Invitation;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid, guest: Uuid, board: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let invite = Invitation::send(&pool, owner, guest, board).await?;
///
/// for pending in Invitation::pending_for(&pool, guest).await? {
///     println!("{} invited you to {}", pending.person_name, pending.board_name);
/// }
///
/// Invitation::accept(&pool, invite.id).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Invitation lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InvitationStatus::Pending => "PENDING",
            InvitationStatus::Accepted => "ACCEPTED",
            InvitationStatus::Declined => "DECLINED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub board_id: Uuid,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

/// Invitation joined with the other party's username and the board title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InvitationView {
    pub id: Uuid,

    /// Sender's username in the inbox and archive, receiver's in the outbox
    pub person_name: String,

    pub board_id: Uuid,
    pub board_name: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    /// Invites `receiver_id` to a board
    ///
    /// An existing invitation for the same receiver and board is reset to
    /// PENDING with the new sender and timestamp.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the sender invites themself
    /// - `Conflict` if the receiver is already a member or owns the board
    /// - `NotFound` if the board does not exist
    pub async fn send(
        pool: &PgPool,
        sender_id: Uuid,
        receiver_id: Uuid,
        board_id: Uuid,
    ) -> StoreResult<Self> {
        if sender_id == receiver_id {
            return Err(StoreError::Conflict("cannot invite yourself".to_string()));
        }

        let (is_owner, is_member): (Option<bool>, bool) = sqlx::query_as(
            r#"
            SELECT
                (SELECT user_id = $2 FROM boards WHERE id = $1),
                EXISTS(SELECT 1 FROM board_members WHERE board_id = $1 AND user_id = $2)
            "#,
        )
        .bind(board_id)
        .bind(receiver_id)
        .fetch_one(pool)
        .await?;

        match is_owner {
            None => return Err(StoreError::not_found("Board", board_id)),
            Some(true) => {
                return Err(StoreError::Conflict(
                    "user is the owner of this board".to_string(),
                ))
            }
            Some(false) => {}
        }
        if is_member {
            return Err(StoreError::Conflict(
                "user is already a member of this board".to_string(),
            ));
        }

        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO invitations (sender_id, receiver_id, board_id, status)
            VALUES ($1, $2, $3, 'PENDING')
            ON CONFLICT (receiver_id, board_id) DO UPDATE
            SET sender_id = EXCLUDED.sender_id,
                status = 'PENDING',
                created_at = NOW()
            RETURNING id, sender_id, receiver_id, board_id, status, created_at
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(board_id)
        .fetch_one(pool)
        .await?;

        info!(
            invitation_id = %invitation.id,
            board_id = %board_id,
            receiver_id = %receiver_id,
            "Invitation sent"
        );
        Ok(invitation)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> StoreResult<Self> {
        sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, sender_id, receiver_id, board_id, status, created_at
            FROM invitations WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Invitation", id))
    }

    /// Accepts a pending invitation and adds the receiver to the board
    ///
    /// The invitation row is locked for the duration of the transaction so
    /// two concurrent accepts cannot both pass the PENDING check. Dropping
    /// the transaction on any error rolls back both writes.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the invitation does not exist
    /// - `Conflict` if it is not PENDING
    pub async fn accept(pool: &PgPool, id: Uuid) -> StoreResult<Self> {
        let mut tx = pool.begin().await?;

        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, sender_id, receiver_id, board_id, status, created_at
            FROM invitations WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::not_found("Invitation", id))?;

        if invitation.status != InvitationStatus::Pending {
            return Err(StoreError::Conflict(format!(
                "invitation is already {}",
                invitation.status
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO board_members (board_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (board_id, user_id) DO NOTHING
            "#,
        )
        .bind(invitation.board_id)
        .bind(invitation.receiver_id)
        .execute(&mut *tx)
        .await?;

        let accepted = sqlx::query_as::<_, Invitation>(
            r#"
            UPDATE invitations SET status = 'ACCEPTED'
            WHERE id = $1
            RETURNING id, sender_id, receiver_id, board_id, status, created_at
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            invitation_id = %id,
            board_id = %accepted.board_id,
            user_id = %accepted.receiver_id,
            "Invitation accepted"
        );
        Ok(accepted)
    }

    /// Declines an invitation
    ///
    /// Declining twice is allowed; declining an accepted invitation is not.
    pub async fn decline(pool: &PgPool, id: Uuid) -> StoreResult<Self> {
        let declined = sqlx::query_as::<_, Invitation>(
            r#"
            UPDATE invitations SET status = 'DECLINED'
            WHERE id = $1 AND status <> 'ACCEPTED'
            RETURNING id, sender_id, receiver_id, board_id, status, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        match declined {
            Some(invitation) => {
                info!(invitation_id = %id, "Invitation declined");
                Ok(invitation)
            }
            // Either missing or accepted; tell them apart for the caller
            None => {
                let existing = Self::find_by_id(pool, id).await?;
                Err(StoreError::Conflict(format!(
                    "invitation is already {}",
                    existing.status
                )))
            }
        }
    }

    /// Pending invitations addressed to the user, newest first
    pub async fn pending_for(pool: &PgPool, receiver_id: Uuid) -> StoreResult<Vec<InvitationView>> {
        let views = sqlx::query_as::<_, InvitationView>(
            r#"
            SELECT i.id, u.username AS person_name, b.id AS board_id, b.title AS board_name,
                   i.status, i.created_at
            FROM invitations i
            JOIN users u ON i.sender_id = u.id
            JOIN boards b ON i.board_id = b.id
            WHERE i.receiver_id = $1 AND i.status = 'PENDING'
            ORDER BY i.created_at DESC
            "#,
        )
        .bind(receiver_id)
        .fetch_all(pool)
        .await?;

        debug!(user_id = %receiver_id, count = views.len(), "Loaded pending invitations");
        Ok(views)
    }

    /// Every invitation the user has sent, any status, newest first
    pub async fn outgoing_for(pool: &PgPool, sender_id: Uuid) -> StoreResult<Vec<InvitationView>> {
        let views = sqlx::query_as::<_, InvitationView>(
            r#"
            SELECT i.id, u.username AS person_name, b.id AS board_id, b.title AS board_name,
                   i.status, i.created_at
            FROM invitations i
            JOIN users u ON i.receiver_id = u.id
            JOIN boards b ON i.board_id = b.id
            WHERE i.sender_id = $1
            ORDER BY i.created_at DESC
            "#,
        )
        .bind(sender_id)
        .fetch_all(pool)
        .await?;

        Ok(views)
    }

    /// Answered invitations addressed to the user, newest first
    pub async fn archived_for(
        pool: &PgPool,
        receiver_id: Uuid,
    ) -> StoreResult<Vec<InvitationView>> {
        let views = sqlx::query_as::<_, InvitationView>(
            r#"
            SELECT i.id, u.username AS person_name, b.id AS board_id, b.title AS board_name,
                   i.status, i.created_at
            FROM invitations i
            JOIN users u ON i.sender_id = u.id
            JOIN boards b ON i.board_id = b.id
            WHERE i.receiver_id = $1 AND i.status <> 'PENDING'
            ORDER BY i.created_at DESC
            "#,
        )
        .bind(receiver_id)
        .fetch_all(pool)
        .await?;

        Ok(views)
    }
}

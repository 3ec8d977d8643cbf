/// Board service
///
/// Entry point for every board, list, card, invitation and notification
/// action a view can trigger. Each method takes the acting user, checks what
/// that user may do, calls the store and publishes an `AppEvent` so other
/// mounted views can reload.
///
/// Permissions:
///
/// - owner: edit and delete the board, invite users, remove members
/// - owner and members: read the board, edit its lists and cards
/// - members: leave the board
/// - receiver of an invitation: accept or decline it
///
/// # Example
///
/// ```no_run
/// use planner_app::boards::BoardService;
/// use planner_app::state::AppState;
/// use planner_shared::models::user::UserLookup;
///
/// # async fn example(state: AppState) -> planner_app::error::AppResult<()> {
/// let service = BoardService::new(state.clone());
/// let me = state.current_user().expect("signed in");
///
/// let board = service.create_board(me.id, "Trip", "Summer vacation").await?;
/// service.invite(me.id, board.id, UserLookup::Email("friend@example.com")).await?;
/// # Ok(())
/// # }
/// ```

use planner_shared::models::board::Board;
use planner_shared::models::board_member::BoardMember;
use planner_shared::models::card::Card;
use planner_shared::models::invitation::{Invitation, InvitationView};
use planner_shared::models::list::{BoardList, ListColor};
use planner_shared::models::notification::Notification;
use planner_shared::models::user::{User, UserLookup};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::{AppEvent, AppState};

/// A board as shown on the home grid
#[derive(Debug, Clone, Serialize)]
pub struct BoardSummary {
    pub board: Board,
    pub is_owner: bool,
}

/// A list with its cards in display order
#[derive(Debug, Clone, Serialize)]
pub struct ListWithCards {
    pub list: BoardList,
    pub cards: Vec<Card>,
}

/// Everything the board screen renders
#[derive(Debug, Clone, Serialize)]
pub struct BoardDetail {
    pub board: Board,
    pub is_owner: bool,
    pub lists: Vec<ListWithCards>,
}

/// Owner and members of a board
#[derive(Debug, Clone, Serialize)]
pub struct BoardPeople {
    pub owner: User,
    pub members: Vec<User>,
}

/// Notification center tab contents
#[derive(Debug, Clone, Default, Serialize)]
pub struct Inbox {
    pub invitations: Vec<InvitationView>,
    pub notifications: Vec<Notification>,
}

#[derive(Clone)]
pub struct BoardService {
    state: AppState,
}

impl BoardService {
    pub fn new(state: AppState) -> Self {
        BoardService { state }
    }

    /// Owned and joined boards, newest first
    pub async fn boards(&self, user_id: Uuid) -> AppResult<Vec<BoardSummary>> {
        let boards = Board::list_for_user(self.state.pool(), user_id).await?;
        Ok(boards
            .into_iter()
            .map(|board| BoardSummary {
                is_owner: board.user_id == user_id,
                board,
            })
            .collect())
    }

    pub async fn create_board(
        &self,
        owner_id: Uuid,
        title: &str,
        description: &str,
    ) -> AppResult<Board> {
        let board = Board::create(self.state.pool(), title, description, owner_id).await?;
        self.state.publish(AppEvent::BoardsChanged);
        Ok(board)
    }

    pub async fn update_board(
        &self,
        actor: Uuid,
        board_id: Uuid,
        title: &str,
        description: &str,
    ) -> AppResult<Board> {
        self.require_owner(actor, board_id).await?;
        let board = Board::update(self.state.pool(), board_id, title, description).await?;
        self.state.publish(AppEvent::BoardsChanged);
        Ok(board)
    }

    /// Deletes the board with all of its lists, cards and invitations
    pub async fn delete_board(&self, actor: Uuid, board_id: Uuid) -> AppResult<()> {
        self.require_owner(actor, board_id).await?;
        Board::delete(self.state.pool(), board_id).await?;
        self.state.publish(AppEvent::BoardsChanged);
        Ok(())
    }

    /// Loads a board with its lists and their cards
    pub async fn open_board(&self, actor: Uuid, board_id: Uuid) -> AppResult<BoardDetail> {
        let board = self.require_access(actor, board_id).await?;
        let pool = self.state.pool();

        let mut lists = Vec::new();
        for list in BoardList::list_by_board(pool, board_id).await? {
            let cards = Card::list_by_list(pool, list.id).await?;
            lists.push(ListWithCards { list, cards });
        }

        tracing::debug!(board_id = %board_id, lists = lists.len(), "Board opened");
        Ok(BoardDetail {
            is_owner: board.user_id == actor,
            board,
            lists,
        })
    }

    pub async fn people(&self, actor: Uuid, board_id: Uuid) -> AppResult<BoardPeople> {
        let board = self.require_access(actor, board_id).await?;
        let pool = self.state.pool();

        Ok(BoardPeople {
            owner: User::find_by_id(pool, board.user_id).await?,
            members: Board::members(pool, board_id).await?,
        })
    }

    pub async fn add_list(&self, actor: Uuid, board_id: Uuid, title: &str) -> AppResult<BoardList> {
        self.require_access(actor, board_id).await?;
        let list = BoardList::create(self.state.pool(), title, board_id).await?;
        self.state.publish(AppEvent::BoardContentChanged { board_id });
        Ok(list)
    }

    pub async fn update_list(
        &self,
        actor: Uuid,
        list_id: Uuid,
        title: &str,
        color: ListColor,
    ) -> AppResult<BoardList> {
        let board_id = self.list_board(actor, list_id).await?;
        let list = BoardList::update(self.state.pool(), list_id, title, color).await?;
        self.state.publish(AppEvent::BoardContentChanged { board_id });
        Ok(list)
    }

    pub async fn delete_list(&self, actor: Uuid, list_id: Uuid) -> AppResult<()> {
        let board_id = self.list_board(actor, list_id).await?;
        BoardList::delete(self.state.pool(), list_id).await?;
        self.state.publish(AppEvent::BoardContentChanged { board_id });
        Ok(())
    }

    pub async fn add_card(
        &self,
        actor: Uuid,
        list_id: Uuid,
        title: &str,
        description: &str,
    ) -> AppResult<Card> {
        let board_id = self.list_board(actor, list_id).await?;
        let card = Card::create(self.state.pool(), title, description, list_id).await?;
        self.state.publish(AppEvent::BoardContentChanged { board_id });
        Ok(card)
    }

    pub async fn update_card(
        &self,
        actor: Uuid,
        card_id: Uuid,
        title: &str,
        description: &str,
    ) -> AppResult<Card> {
        let board_id = self.card_board(actor, card_id).await?;
        let card = Card::update(self.state.pool(), card_id, title, description).await?;
        self.state.publish(AppEvent::BoardContentChanged { board_id });
        Ok(card)
    }

    /// Drops a card onto another list; it lands at the end
    pub async fn move_card(&self, actor: Uuid, card_id: Uuid, list_id: Uuid) -> AppResult<Card> {
        let board_id = self.card_board(actor, card_id).await?;
        let card = Card::move_to_list(self.state.pool(), card_id, list_id).await?;
        self.state.publish(AppEvent::BoardContentChanged { board_id });
        Ok(card)
    }

    /// Drops a card at a new position within its list
    pub async fn reorder_card(&self, actor: Uuid, card_id: Uuid, position: i32) -> AppResult<Card> {
        let board_id = self.card_board(actor, card_id).await?;
        let card = Card::set_position(self.state.pool(), card_id, position).await?;
        self.state.publish(AppEvent::BoardContentChanged { board_id });
        Ok(card)
    }

    pub async fn delete_card(&self, actor: Uuid, card_id: Uuid) -> AppResult<()> {
        let board_id = self.card_board(actor, card_id).await?;
        Card::delete(self.state.pool(), card_id).await?;
        self.state.publish(AppEvent::BoardContentChanged { board_id });
        Ok(())
    }

    /// Invites the user found by `lookup` to the actor's board
    pub async fn invite(
        &self,
        actor: Uuid,
        board_id: Uuid,
        lookup: UserLookup<'_>,
    ) -> AppResult<Invitation> {
        self.require_owner(actor, board_id).await?;
        let receiver = User::find_id(self.state.pool(), lookup).await?;
        let invitation = Invitation::send(self.state.pool(), actor, receiver, board_id).await?;

        self.state.publish(AppEvent::InvitationsChanged { user_id: receiver });
        Ok(invitation)
    }

    pub async fn accept(&self, actor: Uuid, invitation_id: Uuid) -> AppResult<Invitation> {
        self.require_receiver(actor, invitation_id).await?;
        let invitation = Invitation::accept(self.state.pool(), invitation_id).await?;

        self.state.publish(AppEvent::InvitationsChanged { user_id: actor });
        self.state.publish(AppEvent::BoardsChanged);
        Ok(invitation)
    }

    pub async fn decline(&self, actor: Uuid, invitation_id: Uuid) -> AppResult<Invitation> {
        self.require_receiver(actor, invitation_id).await?;
        let invitation = Invitation::decline(self.state.pool(), invitation_id).await?;

        self.state.publish(AppEvent::InvitationsChanged { user_id: actor });
        Ok(invitation)
    }

    /// Owner removes a member; the member is notified
    pub async fn remove_member(&self, actor: Uuid, board_id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.require_owner(actor, board_id).await?;
        BoardMember::remove(self.state.pool(), board_id, user_id).await?;

        self.state.publish(AppEvent::NotificationsChanged { user_id });
        self.state.publish(AppEvent::BoardsChanged);
        Ok(())
    }

    /// Member leaves a board; the owner is notified
    pub async fn leave(&self, actor: &User, board_id: Uuid) -> AppResult<()> {
        let board = Board::find_by_id(self.state.pool(), board_id).await?;
        if board.user_id == actor.id {
            return Err(AppError::Conflict(
                "the owner cannot leave their own board".to_string(),
            ));
        }

        BoardMember::leave(self.state.pool(), board_id, actor.id, &actor.display_name()).await?;

        self.state.publish(AppEvent::NotificationsChanged {
            user_id: board.user_id,
        });
        self.state.publish(AppEvent::BoardsChanged);
        Ok(())
    }

    /// Pending invitations and unread notifications
    pub async fn inbox(&self, user_id: Uuid) -> AppResult<Inbox> {
        let pool = self.state.pool();
        Ok(Inbox {
            invitations: Invitation::pending_for(pool, user_id).await?,
            notifications: Notification::unread_for(pool, user_id).await?,
        })
    }

    /// Invitations the user has sent
    pub async fn outbox(&self, user_id: Uuid) -> AppResult<Vec<InvitationView>> {
        Ok(Invitation::outgoing_for(self.state.pool(), user_id).await?)
    }

    /// Answered invitations and read notifications
    pub async fn archive(&self, user_id: Uuid) -> AppResult<Inbox> {
        let pool = self.state.pool();
        Ok(Inbox {
            invitations: Invitation::archived_for(pool, user_id).await?,
            notifications: Notification::read_for(pool, user_id).await?,
        })
    }

    /// Number shown on the bell icon
    pub async fn badge_count(&self, user_id: Uuid) -> AppResult<i64> {
        let pool = self.state.pool();
        let pending = Invitation::pending_for(pool, user_id).await?.len() as i64;
        let unread = Notification::unread_count(pool, user_id).await?;
        Ok(pending + unread)
    }

    pub async fn mark_read(&self, actor: Uuid, notification_id: Uuid) -> AppResult<()> {
        Notification::mark_read(self.state.pool(), actor, notification_id).await?;
        self.state.publish(AppEvent::NotificationsChanged { user_id: actor });
        Ok(())
    }

    async fn require_owner(&self, actor: Uuid, board_id: Uuid) -> AppResult<Board> {
        let board = Board::find_by_id(self.state.pool(), board_id).await?;
        if board.user_id != actor {
            tracing::warn!(board_id = %board_id, user_id = %actor, "Owner-only action refused");
            return Err(AppError::Forbidden(
                "only the board owner can do this".to_string(),
            ));
        }
        Ok(board)
    }

    async fn require_access(&self, actor: Uuid, board_id: Uuid) -> AppResult<Board> {
        let pool = self.state.pool();
        let board = Board::find_by_id(pool, board_id).await?;
        if board.user_id != actor && !BoardMember::is_member(pool, board_id, actor).await? {
            tracing::warn!(board_id = %board_id, user_id = %actor, "Board access refused");
            return Err(AppError::Forbidden(
                "you are not a member of this board".to_string(),
            ));
        }
        Ok(board)
    }

    async fn require_receiver(&self, actor: Uuid, invitation_id: Uuid) -> AppResult<()> {
        let invitation = Invitation::find_by_id(self.state.pool(), invitation_id).await?;
        if invitation.receiver_id != actor {
            return Err(AppError::Forbidden(
                "this invitation is addressed to someone else".to_string(),
            ));
        }
        Ok(())
    }

    /// Board of a list, after checking access
    async fn list_board(&self, actor: Uuid, list_id: Uuid) -> AppResult<Uuid> {
        let list = BoardList::find_by_id(self.state.pool(), list_id).await?;
        self.require_access(actor, list.board_id).await?;
        Ok(list.board_id)
    }

    /// Board of a card, after checking access
    async fn card_board(&self, actor: Uuid, card_id: Uuid) -> AppResult<Uuid> {
        let card = Card::find_by_id(self.state.pool(), card_id).await?;
        self.list_board(actor, card.list_id).await
    }
}

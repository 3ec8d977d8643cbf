/// Database models for the planner
///
/// Each model is a plain record with associated async functions that take
/// the pool (or a transaction connection) and return `StoreResult`.
///
/// # Models
///
/// - `user`: Accounts, login and profile
/// - `board`: Kanban boards
/// - `board_member`: Memberships, remove and leave
/// - `invitation`: Invite, accept, decline and the invitation views
/// - `notification`: Messages produced by membership changes
/// - `list`: Board columns with a color tag
/// - `card`: Cards, moving and ordering
/// - `habit`: Habits, completions and monthly aggregates
///
/// # Example
///
/// ```no_run
/// use planner_shared::db::pool::{connect, PoolSettings};
/// use planner_shared::models::board::Board;
/// use planner_shared::models::list::BoardList;
/// use planner_shared::models::card::Card;
/// use uuid::Uuid;
///
/// # async fn example(owner_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = connect(&PoolSettings::new("postgresql://localhost/planner")).await?;
///
/// let board = Board::create(&pool, "Trip", "", owner_id).await?;
/// let todo = BoardList::create(&pool, "To do", board.id).await?;
/// let card = Card::create(&pool, "Buy tickets", "", todo.id).await?;
/// assert_eq!(card.position, 1);
/// # Ok(())
/// # }
/// ```

pub mod board;
pub mod board_member;
pub mod card;
pub mod habit;
pub mod invitation;
pub mod list;
pub mod notification;
pub mod user;

/// Integration tests for the board service
///
/// Require PostgreSQL via DATABASE_URL; skipped otherwise.

use planner_app::boards::BoardService;
use planner_app::config::Config;
use planner_app::error::AppError;
use planner_app::state::{AppEvent, AppState};
use planner_shared::db::migrations::migrate;
use planner_shared::db::pool::{connect, PoolSettings};
use planner_shared::models::list::ListColor;
use planner_shared::models::user::{NewUser, User, UserLookup};
use uuid::Uuid;

async fn test_state() -> Option<AppState> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some(url.clone()),
        "GOOGLE_API_KEY" => Some("test-key".to_string()),
        _ => None,
    })
    .expect("test config");

    let pool = connect(&PoolSettings::new(config.database.url.clone()).max_connections(5))
        .await
        .expect("Failed to connect to test database");
    migrate(&pool).await.expect("Failed to run migrations");

    Some(AppState::new(pool, config))
}

async fn create_user(state: &AppState, name: &str) -> User {
    let tag = Uuid::new_v4().simple().to_string();
    User::create(
        state.pool(),
        NewUser {
            username: format!("{}_{}", name, &tag[..12]),
            email: format!("{}-{}@example.com", name, tag),
            phone: format!("+{}", &tag[..20]),
            password_hash: "test_hash".to_string(),
        },
    )
    .await
    .expect("Failed to create test user")
}

#[tokio::test]
async fn test_trip_flow_through_service() {
    let Some(state) = test_state().await else {
        return;
    };
    let service = BoardService::new(state.clone());
    let a = create_user(&state, "a").await;
    let b = create_user(&state, "b").await;
    let mut events = state.subscribe();

    let trip = service.create_board(a.id, "Trip", "").await.unwrap();
    assert_eq!(events.recv().await.unwrap(), AppEvent::BoardsChanged);

    let invite = service
        .invite(a.id, trip.id, UserLookup::Username(&b.username))
        .await
        .unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        AppEvent::InvitationsChanged { user_id: b.id }
    );
    assert_eq!(service.badge_count(b.id).await.unwrap(), 1);

    // Only the receiver may answer
    assert!(matches!(
        service.accept(a.id, invite.id).await,
        Err(AppError::Forbidden(_))
    ));
    service.accept(b.id, invite.id).await.unwrap();

    let summaries = service.boards(b.id).await.unwrap();
    let shared = summaries.iter().find(|s| s.board.id == trip.id).unwrap();
    assert!(!shared.is_owner);

    let people = service.people(b.id, trip.id).await.unwrap();
    assert_eq!(people.owner.id, a.id);
    assert_eq!(people.members.len(), 1);

    service.remove_member(a.id, trip.id, b.id).await.unwrap();
    let inbox = service.inbox(b.id).await.unwrap();
    assert!(inbox.invitations.is_empty());
    assert_eq!(inbox.notifications.len(), 1);
    assert!(inbox.notifications[0].message.contains("Trip"));

    service
        .mark_read(b.id, inbox.notifications[0].id)
        .await
        .unwrap();
    assert_eq!(service.badge_count(b.id).await.unwrap(), 0);
    assert_eq!(service.archive(b.id).await.unwrap().notifications.len(), 1);
}

#[tokio::test]
async fn test_owner_only_actions_are_forbidden_for_members() {
    let Some(state) = test_state().await else {
        return;
    };
    let service = BoardService::new(state.clone());
    let a = create_user(&state, "a").await;
    let b = create_user(&state, "b").await;
    let c = create_user(&state, "c").await;

    let board = service.create_board(a.id, "Team", "").await.unwrap();
    let invite = service
        .invite(a.id, board.id, UserLookup::Email(&b.email))
        .await
        .unwrap();
    service.accept(b.id, invite.id).await.unwrap();

    assert!(matches!(
        service.update_board(b.id, board.id, "Mine", "").await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        service.delete_board(b.id, board.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        service.invite(b.id, board.id, UserLookup::Phone(&c.phone)).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        service.open_board(c.id, board.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        service.leave(&a, board.id).await,
        Err(AppError::Conflict(_))
    ));

    // Members can edit content
    let list = service.add_list(b.id, board.id, "Ideas").await.unwrap();
    service
        .update_list(b.id, list.id, "Ideas", ListColor::Green)
        .await
        .unwrap();
    service.add_card(b.id, list.id, "Offsite", "").await.unwrap();

    let detail = service.open_board(b.id, board.id).await.unwrap();
    assert!(!detail.is_owner);
    assert_eq!(detail.lists.len(), 1);
    assert_eq!(detail.lists[0].list.color, ListColor::Green);
    assert_eq!(detail.lists[0].cards.len(), 1);

    service.leave(&b, board.id).await.unwrap();
    assert!(matches!(
        service.open_board(b.id, board.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert_eq!(service.inbox(a.id).await.unwrap().notifications.len(), 1);
}

#[tokio::test]
async fn test_card_moves_and_reorders() {
    let Some(state) = test_state().await else {
        return;
    };
    let service = BoardService::new(state.clone());
    let a = create_user(&state, "a").await;

    let board = service.create_board(a.id, "Sprint", "").await.unwrap();
    let todo = service.add_list(a.id, board.id, "To do").await.unwrap();
    let done = service.add_list(a.id, board.id, "Done").await.unwrap();
    let first = service.add_card(a.id, todo.id, "First", "").await.unwrap();
    let second = service.add_card(a.id, todo.id, "Second", "").await.unwrap();

    service.reorder_card(a.id, second.id, 0).await.unwrap();
    let moved = service.move_card(a.id, first.id, done.id).await.unwrap();
    assert_eq!(moved.list_id, done.id);

    let detail = service.open_board(a.id, board.id).await.unwrap();
    assert_eq!(detail.lists[0].cards[0].id, second.id);
    assert_eq!(detail.lists[1].cards[0].id, first.id);

    service.delete_card(a.id, second.id).await.unwrap();
    service.delete_list(a.id, done.id).await.unwrap();
    let detail = service.open_board(a.id, board.id).await.unwrap();
    assert_eq!(detail.lists.len(), 1);
    assert!(detail.lists[0].cards.is_empty());

    service.delete_board(a.id, board.id).await.unwrap();
    assert!(matches!(
        service.open_board(a.id, board.id).await,
        Err(AppError::NotFound(_))
    ));
}

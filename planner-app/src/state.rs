/// Application state shared by every view
///
/// `AppState` is cheap to clone and is handed to each view when it is
/// constructed. It carries the database pool and configuration, the signed-in
/// user, the color theme and a broadcast channel of change events.
///
/// Theme and session live in `watch` channels: a view reads the current
/// value on mount and awaits `changed()` to restyle or log out. Data changes
/// go out on a `broadcast` channel so every mounted view can decide whether
/// to reload.
///
/// # Example
///
/// ```no_run
/// use planner_app::state::{AppEvent, AppState, Theme};
///
/// # async fn example(state: AppState) {
/// let mut theme = state.subscribe_theme();
/// let mut events = state.subscribe();
///
/// state.set_theme(Theme::Dark);
/// theme.changed().await.ok();
/// assert_eq!(*theme.borrow(), Theme::Dark);
///
/// if let Ok(AppEvent::BoardsChanged) = events.recv().await {
///     // reload the board grid
/// }
/// # }
/// ```

use planner_shared::models::user::User;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use crate::config::Config;

/// Capacity of the change event channel
const EVENT_CAPACITY: usize = 64;

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Data change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A board was created, renamed, deleted, joined or left
    BoardsChanged,

    /// Lists or cards of one board changed
    BoardContentChanged { board_id: Uuid },

    /// Invitations addressed to or sent by the user changed
    InvitationsChanged { user_id: Uuid },

    NotificationsChanged { user_id: Uuid },

    HabitsChanged { user_id: Uuid },
}

struct Inner {
    pool: PgPool,
    config: Config,
    theme: watch::Sender<Theme>,
    session: watch::Sender<Option<User>>,
    events: broadcast::Sender<AppEvent>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let (theme, _) = watch::channel(Theme::default());
        let (session, _) = watch::channel(None);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        AppState {
            inner: Arc::new(Inner {
                pool,
                config,
                theme,
                session,
                events,
            }),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn theme(&self) -> Theme {
        *self.inner.theme.borrow()
    }

    /// Changes the theme; subscribers are woken only if it actually changed
    pub fn set_theme(&self, theme: Theme) {
        self.inner.theme.send_if_modified(|current| {
            if *current == theme {
                false
            } else {
                *current = theme;
                true
            }
        });
        tracing::debug!(theme = ?theme, "Theme set");
    }

    pub fn toggle_theme(&self) -> Theme {
        let next = self.theme().toggled();
        self.set_theme(next);
        next
    }

    pub fn subscribe_theme(&self) -> watch::Receiver<Theme> {
        self.inner.theme.subscribe()
    }

    /// Signed-in user, if any
    pub fn current_user(&self) -> Option<User> {
        self.inner.session.borrow().clone()
    }

    pub fn sign_in(&self, user: User) {
        tracing::info!(user_id = %user.id, "User signed in");
        self.inner.session.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.inner.session.send_replace(None) {
            tracing::info!(user_id = %user.id, "User signed out");
        }
    }

    pub fn subscribe_session(&self) -> watch::Receiver<Option<User>> {
        self.inner.session.subscribe()
    }

    /// Publishes a change event
    ///
    /// Having no subscribers is not an error; nobody needs to reload.
    pub fn publish(&self, event: AppEvent) {
        tracing::trace!(event = ?event, "Publishing app event");
        let _ = self.inner.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.inner.events.subscribe()
    }
}

//! # Planner Application Core
//!
//! Everything between the screens and the data layer: configuration, shared
//! application state, view-scoped background work, the board service, the
//! habit calendar controller and the chat assistant client.
//!
//! ## Modules
//!
//! - `config`: Environment configuration
//! - `error`: `AppError`, what views receive when an action fails
//! - `state`: `AppState` with theme, session and change events
//! - `tasks`: `ViewScope`, cancellable background queries
//! - `boards`: Board, list, card and invitation actions with permission checks
//! - `habits`: `HabitCalendar` over a `HabitStore`
//! - `chat`: Planning assistant client
//!
//! ## Example
//!
//! ```no_run
//! use planner_app::boards::BoardService;
//! use planner_app::config::Config;
//! use planner_app::state::AppState;
//! use planner_shared::db::pool::{connect, PoolSettings};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = connect(&PoolSettings::new(config.database.url.clone())).await?;
//!
//! let state = AppState::new(pool, config);
//! let boards = BoardService::new(state.clone());
//! # Ok(())
//! # }
//! ```

pub mod boards;
pub mod chat;
pub mod config;
pub mod error;
pub mod habits;
pub mod state;
pub mod tasks;

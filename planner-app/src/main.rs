//! # Planner
//!
//! Process launch for the planner core. Sets up logging, reads the
//! configuration, connects to PostgreSQL, brings the schema up to date and
//! builds the application state the views run against.
//!
//! ## Usage
//!
//! ```bash
//! GOOGLE_API_KEY=... DATABASE_URL=postgresql://planner@localhost/planner cargo run -p planner-app
//! ```

use anyhow::Context;
use planner_app::config::Config;
use planner_app::state::AppState;
use planner_shared::db::migrations::migrate;
use planner_shared::db::pool::{connect, shutdown, PoolSettings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planner_app=debug,planner_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Planner v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("Failed to load configuration")?;

    let settings =
        PoolSettings::new(config.database.url.clone()).max_connections(config.database.max_connections);
    let pool = connect(&settings)
        .await
        .context("Failed to connect to database")?;

    migrate(&pool)
        .await
        .context("Failed to apply database migrations")?;

    let state = AppState::new(pool.clone(), config);
    tracing::info!(
        model = %state.config().chat.model,
        query_timeout_secs = state.config().query_timeout.as_secs(),
        "Planner ready"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, exiting...");

    drop(state);
    shutdown(pool).await;

    Ok(())
}

/// Embedded schema and schema checks
///
/// `migrations/` is compiled into the binary, so the client brings an empty
/// database up to date on launch. `schema_status` and `missing_tables` let
/// tests and diagnostics see what a live database actually has.

use sqlx::migrate::{MigrateDatabase, MigrateError, Migrator};
use sqlx::{PgPool, Postgres};
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::error::StoreResult;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Tables the models read and write
pub const PLANNER_TABLES: [&str; 9] = [
    "users",
    "boards",
    "board_members",
    "invitations",
    "notifications",
    "lists",
    "cards",
    "habits",
    "habit_completions",
];

/// Applies every pending migration, each in its own transaction
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    let pending = schema_status(pool).await.map(|s| s.pending.len()).ok();

    MIGRATOR.run(pool).await.map_err(|e| {
        warn!(error = %e, "Schema migration failed");
        e
    })?;

    info!(was_pending = ?pending, "Schema up to date");
    Ok(())
}

/// Embedded migration versions split by whether the database has them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaStatus {
    pub applied: Vec<i64>,
    pub pending: Vec<i64>,
}

impl SchemaStatus {
    pub fn is_current(&self) -> bool {
        self.pending.is_empty()
    }
}

pub async fn schema_status(pool: &PgPool) -> StoreResult<SchemaStatus> {
    let has_table: bool =
        sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await?;

    let done: BTreeSet<i64> = if has_table {
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success")
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect()
    } else {
        BTreeSet::new()
    };

    let (applied, pending) = MIGRATOR
        .iter()
        .map(|m| m.version)
        .partition(|v| done.contains(v));

    Ok(SchemaStatus { applied, pending })
}

/// Planner tables absent from the current schema
pub async fn missing_tables(pool: &PgPool) -> StoreResult<Vec<&'static str>> {
    let present: BTreeSet<String> = sqlx::query_scalar(
        "SELECT table_name::TEXT FROM information_schema.tables WHERE table_schema = current_schema()",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .collect();

    Ok(PLANNER_TABLES
        .iter()
        .copied()
        .filter(|t| !present.contains(*t))
        .collect())
}

/// Creates the database named in `url` on first launch
pub async fn create_database_if_missing(url: &str) -> StoreResult<()> {
    if !Postgres::database_exists(url).await? {
        info!("Creating planner database");
        Postgres::create_database(url).await?;
    }
    Ok(())
}

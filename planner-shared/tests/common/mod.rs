#![allow(dead_code)]

/// Common test utilities for integration tests
///
/// - Test database connection (skipped when `DATABASE_URL` is unset)
/// - Migrations applied once per pool
/// - Users with unique names so tests can share one database

use planner_shared::db::migrations::{create_database_if_missing, migrate};
use planner_shared::db::pool::{connect, PoolSettings};
use planner_shared::models::user::{NewUser, User};
use sqlx::PgPool;
use uuid::Uuid;

/// Connects to the test database and migrates it
///
/// Returns `None` when `DATABASE_URL` is not set so the suite passes on
/// machines without PostgreSQL.
pub async fn test_pool() -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    create_database_if_missing(&url)
        .await
        .expect("Failed to create test database");

    let pool = connect(&PoolSettings::new(url).max_connections(5).min_idle(1))
        .await
        .expect("Failed to connect to test database");

    migrate(&pool).await.expect("Failed to run migrations");
    Some(pool)
}

/// Creates a user whose username/email/phone cannot collide with other tests
pub async fn create_user(pool: &PgPool, name: &str) -> User {
    let tag = Uuid::new_v4().simple().to_string();
    User::create(
        pool,
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

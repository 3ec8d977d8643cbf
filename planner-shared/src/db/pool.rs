/// Connection pool for the planner database
///
/// One `PgPool` is opened at launch and shared by every view. The settings
/// mirror what a desktop client needs: a small pool, a couple of warm
/// connections, and short idle and lifetime limits so a laptop that slept
/// does not hand out dead sockets.
///
/// # Example
///
/// ```no_run
/// use planner_shared::db::pool::{connect, PoolSettings};
///
/// # async fn example() -> Result<(), planner_shared::error::StoreError> {
/// let settings = PoolSettings::new("postgresql://planner@localhost/planner").max_connections(4);
/// let pool = connect(&settings).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::StoreResult;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_IDLE: u32 = 2;

/// Pool settings
///
/// `min_idle` never exceeds `max_connections`; the builder methods keep them
/// consistent.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_idle: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl PoolSettings {
    /// Settings with the default limits: 10 connections, 2 idle, 10 s to
    /// acquire, 30 s idle, 10 min lifetime
    pub fn new(url: impl Into<String>) -> Self {
        PoolSettings {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_idle: DEFAULT_MIN_IDLE,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(30),
            max_lifetime: Duration::from_secs(600),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self.min_idle = self.min_idle.min(self.max_connections);
        self
    }

    pub fn min_idle(mut self, min: u32) -> Self {
        self.min_idle = min.min(self.max_connections);
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_idle)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .test_before_acquire(true)
    }
}

/// Opens the pool and pings the server once
///
/// # Errors
///
/// `TransientIo` when the server cannot be reached in time, `Database` for
/// anything else (bad URL, authentication).
pub async fn connect(settings: &PoolSettings) -> StoreResult<PgPool> {
    info!(
        max_connections = settings.max_connections,
        min_idle = settings.min_idle,
        acquire_timeout_ms = settings.acquire_timeout.as_millis() as u64,
        "Opening database pool"
    );

    let pool = settings.options().connect(&settings.url).await?;
    ping(&pool).await?;

    info!("Database pool ready");
    Ok(pool)
}

/// Round trip to the server
pub async fn ping(pool: &PgPool) -> StoreResult<()> {
    let _: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;
    debug!("Database ping ok");
    Ok(())
}

/// Pool occupancy at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
}

impl PoolStats {
    pub fn of(pool: &PgPool) -> Self {
        PoolStats {
            size: pool.size(),
            idle: pool.num_idle() as u32,
        }
    }

    /// Connections checked out by running queries
    pub fn in_use(&self) -> u32 {
        self.size.saturating_sub(self.idle)
    }
}

/// Waits for checked-out connections to come back, then closes the pool
pub async fn shutdown(pool: PgPool) {
    let stats = PoolStats::of(&pool);
    info!(in_use = stats.in_use(), "Closing database pool");
    pool.close().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PoolSettings::new("postgresql://localhost/planner");
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.min_idle, 2);
        assert_eq!(settings.acquire_timeout, Duration::from_secs(10));
        assert_eq!(settings.idle_timeout, Duration::from_secs(30));
        assert_eq!(settings.max_lifetime, Duration::from_secs(600));
    }

    #[test]
    fn test_min_idle_is_clamped_to_max() {
        let settings = PoolSettings::new("").max_connections(1);
        assert_eq!(settings.min_idle, 1);

        let settings = PoolSettings::new("").min_idle(50);
        assert_eq!(settings.min_idle, 10);

        let settings = PoolSettings::new("").max_connections(0);
        assert_eq!(settings.max_connections, 1);
    }

    #[test]
    fn test_in_use_never_underflows() {
        let stats = PoolStats { size: 1, idle: 3 };
        assert_eq!(stats.in_use(), 0);
        assert_eq!(PoolStats { size: 4, idle: 1 }.in_use(), 3);
    }
}

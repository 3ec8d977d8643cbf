/// View-scoped background work
///
/// Every mounted view owns a `ViewScope`. Store calls started by the view run
/// on spawned tokio tasks through `ViewScope::run`, which races the call
/// against the scope's cancellation token and a per-query timeout. When the
/// view goes away (the scope is closed or dropped) in-flight calls are
/// aborted and their results are discarded instead of being applied to a
/// view that no longer exists.
///
/// # Example
///
/// ```no_run
/// use planner_app::tasks::ViewScope;
/// use planner_shared::models::board::Board;
/// use std::time::Duration;
/// use uuid::Uuid;
///
/// # async fn example(pool: sqlx::PgPool, user_id: Uuid) {
/// let scope = ViewScope::new("board-grid", Duration::from_secs(30));
///
/// let boards = scope
///     .run(async move { Ok(Board::list_for_user(&pool, user_id).await?) })
///     .await;
///
/// drop(scope); // anything still running is cancelled
/// # }
/// ```

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};

/// Default per-query timeout
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Lifetime of one mounted view
pub struct ViewScope {
    name: &'static str,
    token: CancellationToken,
    timeout: Duration,
}

impl ViewScope {
    pub fn new(name: &'static str, timeout: Duration) -> Self {
        ViewScope {
            name,
            token: CancellationToken::new(),
            timeout,
        }
    }

    /// Scope for a nested view (a dialog, a popup); closing the parent closes
    /// it too
    pub fn child(&self, name: &'static str) -> Self {
        ViewScope {
            name,
            token: self.token.child_token(),
            timeout: self.timeout,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Cancels everything started from this scope
    pub fn close(&self) {
        if self.is_active() {
            tracing::debug!(scope = self.name, "View scope closed");
            self.token.cancel();
        }
    }

    /// Runs `fut` on a background task and waits for it
    ///
    /// # Errors
    ///
    /// - `Cancelled` if the scope is closed first
    /// - `TransientIo` if the call exceeds the query timeout
    /// - whatever error `fut` itself returns
    pub async fn run<F, T>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        race(self.name, &self.token, self.timeout, fut).await
    }

    /// Fire-and-forget variant of `run`
    ///
    /// `deliver` is called with the result only if the scope is still active
    /// when the call finishes.
    pub fn spawn<F, T, D>(&self, fut: F, deliver: D) -> JoinHandle<()>
    where
        F: Future<Output = AppResult<T>> + Send + 'static,
        T: Send + 'static,
        D: FnOnce(AppResult<T>) + Send + 'static,
    {
        let name = self.name;
        let token = self.token.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let result = race(name, &token, timeout, fut).await;
            if token.is_cancelled() {
                tracing::debug!(scope = name, "Discarding result for closed view");
                return;
            }
            deliver(result);
        })
    }
}

async fn race<F, T>(
    name: &'static str,
    token: &CancellationToken,
    timeout: Duration,
    fut: F,
) -> AppResult<T>
where
    F: Future<Output = AppResult<T>> + Send + 'static,
    T: Send + 'static,
{
    if token.is_cancelled() {
        return Err(AppError::Cancelled);
    }

    let mut handle = tokio::spawn(fut);

    tokio::select! {
        biased;

        _ = token.cancelled() => {
            handle.abort();
            tracing::debug!(scope = name, "Query cancelled, view closed");
            Err(AppError::Cancelled)
        }
        _ = sleep(timeout) => {
            handle.abort();
            tracing::warn!(
                scope = name,
                timeout_secs = timeout.as_secs_f64(),
                "Query timed out"
            );
            Err(AppError::TransientIo(format!("query timed out after {:?}", timeout)))
        }
        joined = &mut handle => match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(AppError::Cancelled),
            Err(e) => {
                tracing::error!(scope = name, error = %e, "Background query panicked");
                Err(AppError::Fatal("background task failed".to_string()))
            }
        },
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.close();
    }
}

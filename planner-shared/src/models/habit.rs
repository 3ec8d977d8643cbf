/// Habits and their daily completion log
///
/// A habit belongs to one user. Completing it on a date inserts a
/// `(habit_id, completion_date)` row; un-completing deletes it. Both are
/// idempotent, and the composite primary key rules out duplicates.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE habits (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     seq BIGSERIAL NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     color VARCHAR(32) NOT NULL DEFAULT 'blue',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE habit_completions (
///     habit_id UUID NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
///     completion_date DATE NOT NULL,
///     PRIMARY KEY (habit_id, completion_date)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use planner_shared::models::habit::Habit;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let habit = Habit::create(&pool, user_id, "Read").await?;
/// let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
///
/// Habit::toggle_completion(&pool, habit.id, day, true).await?;
///
/// let counts = Habit::monthly_completion_counts(&pool, user_id, 2024, 3).await?;
/// assert_eq!(counts.get(&5), Some(&1));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Color given to new habits
pub const DEFAULT_HABIT_COLOR: &str = "blue";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// A habit together with its completion flag for one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HabitForDay {
    pub id: Uuid,
    pub title: String,
    pub color: String,
    pub completed: bool,
}

impl Habit {
    /// Creates a habit with the default color
    pub async fn create(pool: &PgPool, user_id: Uuid, title: &str) -> StoreResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::invalid("title", "Habit title is required"));
        }

        let habit = sqlx::query_as::<_, Habit>(
            r#"
            INSERT INTO habits (user_id, title, color)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, color, created_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(DEFAULT_HABIT_COLOR)
        .fetch_one(pool)
        .await?;

        info!(habit_id = %habit.id, user_id = %user_id, "Habit created");
        Ok(habit)
    }

    /// Deletes a habit and its completion log
    pub async fn delete(pool: &PgPool, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Habit", id));
        }

        info!(habit_id = %id, "Habit deleted");
        Ok(())
    }

    /// Every habit of the user with its completion flag on `date`, in
    /// creation order
    pub async fn for_user_on(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<HabitForDay>> {
        let habits = sqlx::query_as::<_, HabitForDay>(
            r#"
            SELECT h.id, h.title, h.color, (hc.habit_id IS NOT NULL) AS completed
            FROM habits h
            LEFT JOIN habit_completions hc
                ON h.id = hc.habit_id AND hc.completion_date = $2
            WHERE h.user_id = $1
            ORDER BY h.seq ASC
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

        debug!(user_id = %user_id, %date, count = habits.len(), "Loaded habits for day");
        Ok(habits)
    }

    /// Completed-habit count per day of month; days with no completions are
    /// absent
    ///
    /// # Errors
    ///
    /// `Validation` if `month` is not in 1..=12
    pub async fn monthly_completion_counts(
        pool: &PgPool,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> StoreResult<BTreeMap<u32, i64>> {
        let (first, next) = month_bounds(year, month)?;

        let rows: Vec<(i32, i64)> = sqlx::query_as(
            r#"
            SELECT EXTRACT(DAY FROM hc.completion_date)::INT AS day, COUNT(*) AS completed
            FROM habit_completions hc
            JOIN habits h ON hc.habit_id = h.id
            WHERE h.user_id = $1
              AND hc.completion_date >= $2
              AND hc.completion_date < $3
            GROUP BY day
            "#,
        )
        .bind(user_id)
        .bind(first)
        .bind(next)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(day, count)| (day as u32, count))
            .collect())
    }

    /// Number of habits the user has
    pub async fn total_count(pool: &PgPool, user_id: Uuid) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM habits WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Marks a habit done or not done on `date`
    ///
    /// Setting the state it already has is a no-op.
    pub async fn toggle_completion(
        pool: &PgPool,
        habit_id: Uuid,
        date: NaiveDate,
        completed: bool,
    ) -> StoreResult<()> {
        if completed {
            sqlx::query(
                r#"
                INSERT INTO habit_completions (habit_id, completion_date)
                VALUES ($1, $2)
                ON CONFLICT (habit_id, completion_date) DO NOTHING
                "#,
            )
            .bind(habit_id)
            .bind(date)
            .execute(pool)
            .await?;
        } else {
            sqlx::query(
                "DELETE FROM habit_completions WHERE habit_id = $1 AND completion_date = $2",
            )
            .bind(habit_id)
            .bind(date)
            .execute(pool)
            .await?;
        }

        debug!(habit_id = %habit_id, %date, completed, "Habit completion set");
        Ok(())
    }
}

/// First day of the month and first day of the following month
pub fn month_bounds(year: i32, month: u32) -> StoreResult<(NaiveDate, NaiveDate)> {
    if !(1..=12).contains(&month) {
        return Err(StoreError::invalid("month", "Month must be between 1 and 12"));
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| StoreError::invalid("year", "Year is out of range"))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| StoreError::invalid("year", "Year is out of range"))?;

    Ok((first, next))
}

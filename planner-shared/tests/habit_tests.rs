/// Integration tests for habits and the completion log
///
/// Require PostgreSQL via DATABASE_URL; skipped otherwise.

mod common;

use chrono::NaiveDate;
use planner_shared::error::StoreError;
use planner_shared::models::habit::Habit;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_read_habit_scenario() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let u = common::create_user(&pool, "u").await;
    let read = Habit::create(&pool, u.id, "Read").await.unwrap();
    assert_eq!(read.color, "blue");

    let march = Habit::monthly_completion_counts(&pool, u.id, 2024, 3).await.unwrap();
    assert!(march.is_empty());
    assert_eq!(Habit::total_count(&pool, u.id).await.unwrap(), 1);

    Habit::toggle_completion(&pool, read.id, date(2024, 3, 5), true)
        .await
        .unwrap();

    let fifth = Habit::for_user_on(&pool, u.id, date(2024, 3, 5)).await.unwrap();
    assert_eq!(fifth.len(), 1);
    assert!(fifth[0].completed);

    let sixth = Habit::for_user_on(&pool, u.id, date(2024, 3, 6)).await.unwrap();
    assert_eq!(sixth.len(), 1);
    assert!(!sixth[0].completed);

    let march = Habit::monthly_completion_counts(&pool, u.id, 2024, 3).await.unwrap();
    assert_eq!(march.len(), 1);
    assert_eq!(march.get(&5), Some(&1));
}

#[tokio::test]
async fn test_toggle_is_idempotent() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let u = common::create_user(&pool, "u").await;
    let habit = Habit::create(&pool, u.id, "Walk").await.unwrap();
    let day = date(2024, 4, 10);

    Habit::toggle_completion(&pool, habit.id, day, true).await.unwrap();
    Habit::toggle_completion(&pool, habit.id, day, true).await.unwrap();

    let counts = Habit::monthly_completion_counts(&pool, u.id, 2024, 4).await.unwrap();
    assert_eq!(counts.get(&10), Some(&1));

    Habit::toggle_completion(&pool, habit.id, day, false).await.unwrap();
    Habit::toggle_completion(&pool, habit.id, day, false).await.unwrap();

    let counts = Habit::monthly_completion_counts(&pool, u.id, 2024, 4).await.unwrap();
    assert!(counts.is_empty());
}

#[tokio::test]
async fn test_day_before_any_completion_is_all_false() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let u = common::create_user(&pool, "u").await;
    Habit::create(&pool, u.id, "Stretch").await.unwrap();
    Habit::create(&pool, u.id, "Journal").await.unwrap();

    let habits = Habit::for_user_on(&pool, u.id, date(2000, 1, 1)).await.unwrap();
    assert_eq!(habits.len(), 2);
    assert!(habits.iter().all(|h| !h.completed));
    assert_eq!(habits[0].title, "Stretch");
    assert_eq!(habits[1].title, "Journal");
}

#[tokio::test]
async fn test_monthly_counts_aggregate_across_habits_and_respect_month_bounds() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let u = common::create_user(&pool, "u").await;
    let run = Habit::create(&pool, u.id, "Run").await.unwrap();
    let swim = Habit::create(&pool, u.id, "Swim").await.unwrap();

    Habit::toggle_completion(&pool, run.id, date(2024, 2, 29), true).await.unwrap();
    Habit::toggle_completion(&pool, swim.id, date(2024, 2, 29), true).await.unwrap();
    Habit::toggle_completion(&pool, run.id, date(2024, 3, 1), true).await.unwrap();

    let feb = Habit::monthly_completion_counts(&pool, u.id, 2024, 2).await.unwrap();
    assert_eq!(feb.len(), 1);
    assert_eq!(feb.get(&29), Some(&2));

    let march = Habit::monthly_completion_counts(&pool, u.id, 2024, 3).await.unwrap();
    assert_eq!(march.get(&1), Some(&1));
}

#[tokio::test]
async fn test_invalid_month_is_validation_error() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let u = common::create_user(&pool, "u").await;

    let result = Habit::monthly_completion_counts(&pool, u.id, 2024, 13).await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
}

#[tokio::test]
async fn test_delete_habit_removes_completions() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let u = common::create_user(&pool, "u").await;
    let habit = Habit::create(&pool, u.id, "Meditate").await.unwrap();
    Habit::toggle_completion(&pool, habit.id, date(2024, 5, 2), true).await.unwrap();

    Habit::delete(&pool, habit.id).await.unwrap();

    assert_eq!(Habit::total_count(&pool, u.id).await.unwrap(), 0);
    let may = Habit::monthly_completion_counts(&pool, u.id, 2024, 5).await.unwrap();
    assert!(may.is_empty());
    assert!(matches!(
        Habit::delete(&pool, habit.id).await,
        Err(StoreError::NotFound { .. })
    ));
}

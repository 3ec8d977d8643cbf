/// Habit calendar controller
///
/// The habit view shows a month heat-map and the habits of one selected day.
/// `HabitCalendar` owns the cached data behind both and keeps it consistent
/// with the store:
///
/// - the month snapshot (per-day completion counts and the habit total) is
///   fetched once per visible month
/// - the day snapshot is fetched on every date selection
/// - toggles are applied to both snapshots immediately and reverted if the
///   write fails
///
/// Store access goes through the `HabitStore` trait so the controller can
/// run against PostgreSQL (`PgHabitStore`) or an in-memory store in tests.
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use planner_app::habits::{HabitCalendar, PgHabitStore};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> planner_app::error::AppResult<()> {
/// let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// let mut calendar = HabitCalendar::new(PgHabitStore::new(pool), user_id, today);
///
/// calendar.open(today).await?;
/// if let Some(habit) = calendar.day().and_then(|d| d.habits.first()).map(|h| h.id) {
///     calendar.toggle(habit).await?;
/// }
///
/// let progress = calendar.day_progress();
/// println!("{}/{} done ({}%)", progress.completed, progress.total, progress.percent);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate};
use planner_shared::error::StoreResult;
use planner_shared::models::habit::{Habit, HabitForDay};
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::{AppEvent, AppState};

/// Store operations the calendar needs
#[async_trait]
pub trait HabitStore: Send + Sync {
    async fn habits_on(&self, user_id: Uuid, date: NaiveDate) -> StoreResult<Vec<HabitForDay>>;

    async fn monthly_counts(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> StoreResult<BTreeMap<u32, i64>>;

    async fn total_habits(&self, user_id: Uuid) -> StoreResult<i64>;

    async fn set_completed(&self, habit_id: Uuid, date: NaiveDate, completed: bool)
        -> StoreResult<()>;

    async fn create_habit(&self, user_id: Uuid, title: &str) -> StoreResult<Habit>;

    async fn delete_habit(&self, habit_id: Uuid) -> StoreResult<()>;
}

/// `HabitStore` backed by the habit tables
#[derive(Clone)]
pub struct PgHabitStore {
    pool: PgPool,
}

impl PgHabitStore {
    pub fn new(pool: PgPool) -> Self {
        PgHabitStore { pool }
    }
}

#[async_trait]
impl HabitStore for PgHabitStore {
    async fn habits_on(&self, user_id: Uuid, date: NaiveDate) -> StoreResult<Vec<HabitForDay>> {
        Habit::for_user_on(&self.pool, user_id, date).await
    }

    async fn monthly_counts(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> StoreResult<BTreeMap<u32, i64>> {
        Habit::monthly_completion_counts(&self.pool, user_id, year, month).await
    }

    async fn total_habits(&self, user_id: Uuid) -> StoreResult<i64> {
        Habit::total_count(&self.pool, user_id).await
    }

    async fn set_completed(
        &self,
        habit_id: Uuid,
        date: NaiveDate,
        completed: bool,
    ) -> StoreResult<()> {
        Habit::toggle_completion(&self.pool, habit_id, date, completed).await
    }

    async fn create_habit(&self, user_id: Uuid, title: &str) -> StoreResult<Habit> {
        Habit::create(&self.pool, user_id, title).await
    }

    async fn delete_habit(&self, habit_id: Uuid) -> StoreResult<()> {
        Habit::delete(&self.pool, habit_id).await
    }
}

/// Cached aggregates for the visible month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSnapshot {
    pub year: i32,
    pub month: u32,

    /// Completed-habit count per day; days without completions are absent
    pub counts: BTreeMap<u32, i64>,

    pub total_habits: i64,
}

impl MonthSnapshot {
    fn contains(&self, date: NaiveDate) -> bool {
        self.year == date.year() && self.month == date.month()
    }
}

/// Cached habits of the selected day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySnapshot {
    pub date: NaiveDate,
    pub habits: Vec<HabitForDay>,
}

/// Progress of the selected day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayProgress {
    pub completed: usize,
    pub total: usize,

    /// Rounded down
    pub percent: u32,
}

/// Heat-map color class of a calendar cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    /// Every habit done
    AllDone,
    /// Some habits done
    Partial,
    /// Nothing done on a past day
    NoneDone,
    /// Future day, or the user has no habits
    Unmarked,
}

/// Controller behind the habit view
pub struct HabitCalendar<S> {
    store: S,
    user_id: Uuid,
    today: NaiveDate,
    selected: NaiveDate,
    month: Option<MonthSnapshot>,
    day: Option<DaySnapshot>,
    state: Option<AppState>,
}

impl<S: HabitStore> HabitCalendar<S> {
    pub fn new(store: S, user_id: Uuid, today: NaiveDate) -> Self {
        HabitCalendar {
            store,
            user_id,
            today,
            selected: today,
            month: None,
            day: None,
            state: None,
        }
    }

    /// Publishes `HabitsChanged` on `state` after every successful write, so
    /// other views showing this user's habits can reload
    pub fn with_state(mut self, state: AppState) -> Self {
        self.state = Some(state);
        self
    }

    fn publish_change(&self) {
        if let Some(state) = &self.state {
            state.publish(AppEvent::HabitsChanged {
                user_id: self.user_id,
            });
        }
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected
    }

    pub fn month(&self) -> Option<&MonthSnapshot> {
        self.month.as_ref()
    }

    pub fn day(&self) -> Option<&DaySnapshot> {
        self.day.as_ref()
    }

    /// Drops every cached value and loads `date`'s month and day
    pub async fn open(&mut self, date: NaiveDate) -> AppResult<()> {
        self.month = None;
        self.day = None;
        self.selected = date;

        self.load_month(date.year(), date.month()).await?;
        self.load_day(date).await
    }

    /// Selects a date; the month is fetched only when it differs from the
    /// cached one
    pub async fn select_date(&mut self, date: NaiveDate) -> AppResult<()> {
        self.selected = date;

        let cached = self.month.as_ref().is_some_and(|m| m.contains(date));
        if !cached {
            self.load_month(date.year(), date.month()).await?;
        }
        self.load_day(date).await
    }

    /// Shows the previous (`-1`) or next (`1`) month without changing the
    /// selected day
    pub async fn shift_month(&mut self, delta: i32) -> AppResult<()> {
        let base = match &self.month {
            Some(m) => NaiveDate::from_ymd_opt(m.year, m.month, 1),
            None => self.selected.with_day(1),
        }
        .ok_or_else(|| AppError::Fatal("invalid calendar month".to_string()))?;

        let months = Months::new(delta.unsigned_abs());
        let target = if delta >= 0 {
            base.checked_add_months(months)
        } else {
            base.checked_sub_months(months)
        }
        .ok_or_else(|| AppError::Fatal("calendar month out of range".to_string()))?;

        self.load_month(target.year(), target.month()).await
    }

    pub async fn add_habit(&mut self, title: &str) -> AppResult<Habit> {
        let habit = self.store.create_habit(self.user_id, title).await?;
        tracing::info!(habit_id = %habit.id, "Habit added");
        self.publish_change();
        self.open(self.selected).await?;
        Ok(habit)
    }

    pub async fn remove_habit(&mut self, habit_id: Uuid) -> AppResult<()> {
        self.store.delete_habit(habit_id).await?;
        tracing::info!(habit_id = %habit_id, "Habit removed");
        self.publish_change();
        self.open(self.selected).await
    }

    /// Flips a habit on the selected day
    ///
    /// Both snapshots change before the write. If the write fails they are
    /// restored and the error is returned. Returns the new completion flag.
    ///
    /// # Errors
    ///
    /// `NotFound` if the habit is not shown on the selected day
    pub async fn toggle(&mut self, habit_id: Uuid) -> AppResult<bool> {
        let day = self
            .day
            .as_mut()
            .ok_or_else(|| AppError::NotFound("no day is loaded".to_string()))?;
        let date = day.date;
        let habit = day
            .habits
            .iter_mut()
            .find(|h| h.id == habit_id)
            .ok_or_else(|| AppError::NotFound(format!("Habit {} not found", habit_id)))?;

        let completed = !habit.completed;
        habit.completed = completed;

        let previous_count = self.month.as_mut().filter(|m| m.contains(date)).map(|m| {
            let day_of_month = date.day();
            let previous = m.counts.get(&day_of_month).copied();
            let current = previous.unwrap_or(0);
            let next = if completed { current + 1 } else { (current - 1).max(0) };
            if next == 0 {
                m.counts.remove(&day_of_month);
            } else {
                m.counts.insert(day_of_month, next);
            }
            previous
        });

        match self.store.set_completed(habit_id, date, completed).await {
            Ok(()) => {
                tracing::debug!(habit_id = %habit_id, %date, completed, "Habit toggled");
                self.publish_change();
                Ok(completed)
            }
            Err(e) => {
                tracing::warn!(habit_id = %habit_id, %date, error = %e, "Toggle failed, rolling back");
                self.rollback_toggle(habit_id, date, !completed, previous_count);
                Err(e.into())
            }
        }
    }

    fn rollback_toggle(
        &mut self,
        habit_id: Uuid,
        date: NaiveDate,
        completed: bool,
        previous_count: Option<Option<i64>>,
    ) {
        if let Some(habit) = self
            .day
            .as_mut()
            .filter(|d| d.date == date)
            .and_then(|d| d.habits.iter_mut().find(|h| h.id == habit_id))
        {
            habit.completed = completed;
        }

        if let (Some(previous), Some(month)) = (
            previous_count,
            self.month.as_mut().filter(|m| m.contains(date)),
        ) {
            match previous {
                Some(count) => month.counts.insert(date.day(), count),
                None => month.counts.remove(&date.day()),
            };
        }
    }

    /// Completed and total habits of the selected day
    pub fn day_progress(&self) -> DayProgress {
        let Some(day) = &self.day else {
            return DayProgress::default();
        };

        let total = day.habits.len();
        let completed = day.habits.iter().filter(|h| h.completed).count();
        let percent = if total == 0 {
            0
        } else {
            (completed * 100 / total) as u32
        };

        DayProgress {
            completed,
            total,
            percent,
        }
    }

    /// Heat-map class of a day in the visible month
    pub fn day_status(&self, day_of_month: u32) -> DayStatus {
        let Some(month) = &self.month else {
            return DayStatus::Unmarked;
        };
        let Some(date) = NaiveDate::from_ymd_opt(month.year, month.month, day_of_month) else {
            return DayStatus::Unmarked;
        };
        if month.total_habits == 0 || date > self.today {
            return DayStatus::Unmarked;
        }

        match month.counts.get(&day_of_month).copied().unwrap_or(0) {
            0 => DayStatus::NoneDone,
            n if n >= month.total_habits => DayStatus::AllDone,
            _ => DayStatus::Partial,
        }
    }

    async fn load_month(&mut self, year: i32, month: u32) -> AppResult<()> {
        let counts = self.store.monthly_counts(self.user_id, year, month).await?;
        let total_habits = self.store.total_habits(self.user_id).await?;

        tracing::debug!(year, month, days = counts.len(), total_habits, "Month loaded");
        self.month = Some(MonthSnapshot {
            year,
            month,
            counts,
            total_habits,
        });
        Ok(())
    }

    async fn load_day(&mut self, date: NaiveDate) -> AppResult<()> {
        let habits = self.store.habits_on(self.user_id, date).await?;
        self.day = Some(DaySnapshot { date, habits });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use planner_shared::error::StoreError;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory store with failure injection and call counting
    #[derive(Default)]
    struct MemoryStore {
        habits: Mutex<Vec<Habit>>,
        done: Mutex<BTreeSet<(Uuid, NaiveDate)>>,
        fail_writes: AtomicBool,
        month_fetches: AtomicUsize,
    }

    impl MemoryStore {
        fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        fn check_write(&self) -> StoreResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                Err(StoreError::TransientIo(sqlx::Error::PoolTimedOut))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl HabitStore for Arc<MemoryStore> {
        async fn habits_on(&self, user_id: Uuid, date: NaiveDate) -> StoreResult<Vec<HabitForDay>> {
            let done = self.done.lock().unwrap();
            Ok(self
                .habits
                .lock()
                .unwrap()
                .iter()
                .filter(|h| h.user_id == user_id)
                .map(|h| HabitForDay {
                    id: h.id,
                    title: h.title.clone(),
                    color: h.color.clone(),
                    completed: done.contains(&(h.id, date)),
                })
                .collect())
        }

        async fn monthly_counts(
            &self,
            user_id: Uuid,
            year: i32,
            month: u32,
        ) -> StoreResult<BTreeMap<u32, i64>> {
            self.month_fetches.fetch_add(1, Ordering::SeqCst);
            let owned: Vec<Uuid> = self
                .habits
                .lock()
                .unwrap()
                .iter()
                .filter(|h| h.user_id == user_id)
                .map(|h| h.id)
                .collect();

            let mut counts = BTreeMap::new();
            for (habit_id, date) in self.done.lock().unwrap().iter() {
                if owned.contains(habit_id) && date.year() == year && date.month() == month {
                    *counts.entry(date.day()).or_insert(0) += 1;
                }
            }
            Ok(counts)
        }

        async fn total_habits(&self, user_id: Uuid) -> StoreResult<i64> {
            Ok(self
                .habits
                .lock()
                .unwrap()
                .iter()
                .filter(|h| h.user_id == user_id)
                .count() as i64)
        }

        async fn set_completed(
            &self,
            habit_id: Uuid,
            date: NaiveDate,
            completed: bool,
        ) -> StoreResult<()> {
            self.check_write()?;
            let mut done = self.done.lock().unwrap();
            if completed {
                done.insert((habit_id, date));
            } else {
                done.remove(&(habit_id, date));
            }
            Ok(())
        }

        async fn create_habit(&self, user_id: Uuid, title: &str) -> StoreResult<Habit> {
            self.check_write()?;
            let habit = Habit {
                id: Uuid::new_v4(),
                user_id,
                title: title.to_string(),
                color: "blue".to_string(),
                created_at: Utc::now(),
            };
            self.habits.lock().unwrap().push(habit.clone());
            Ok(habit)
        }

        async fn delete_habit(&self, habit_id: Uuid) -> StoreResult<()> {
            self.check_write()?;
            self.habits.lock().unwrap().retain(|h| h.id != habit_id);
            self.done.lock().unwrap().retain(|(id, _)| *id != habit_id);
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn calendar_with(
        titles: &[&str],
    ) -> (HabitCalendar<Arc<MemoryStore>>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let user_id = Uuid::new_v4();
        for title in titles {
            store.create_habit(user_id, title).await.unwrap();
        }
        let mut calendar = HabitCalendar::new(store.clone(), user_id, date(2024, 3, 10));
        calendar.open(date(2024, 3, 5)).await.unwrap();
        (calendar, store)
    }

    fn habit_id(calendar: &HabitCalendar<Arc<MemoryStore>>, title: &str) -> Uuid {
        calendar
            .day()
            .unwrap()
            .habits
            .iter()
            .find(|h| h.title == title)
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_open_loads_month_and_day() {
        let (calendar, _) = calendar_with(&["Read"]).await;

        let month = calendar.month().unwrap();
        assert_eq!((month.year, month.month), (2024, 3));
        assert!(month.counts.is_empty());
        assert_eq!(month.total_habits, 1);

        let day = calendar.day().unwrap();
        assert_eq!(day.date, date(2024, 3, 5));
        assert_eq!(day.habits.len(), 1);
        assert!(!day.habits[0].completed);
    }

    #[tokio::test]
    async fn test_select_date_refetches_month_only_when_it_changes() {
        let (mut calendar, store) = calendar_with(&["Read"]).await;
        assert_eq!(store.month_fetches.load(Ordering::SeqCst), 1);

        calendar.select_date(date(2024, 3, 6)).await.unwrap();
        assert_eq!(store.month_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(calendar.day().unwrap().date, date(2024, 3, 6));

        calendar.select_date(date(2024, 4, 1)).await.unwrap();
        assert_eq!(store.month_fetches.load(Ordering::SeqCst), 2);
        assert_eq!(calendar.month().unwrap().month, 4);
    }

    #[tokio::test]
    async fn test_toggle_updates_snapshots_and_store() {
        let (mut calendar, store) = calendar_with(&["Read", "Run"]).await;
        let read = habit_id(&calendar, "Read");

        assert!(calendar.toggle(read).await.unwrap());
        assert_eq!(calendar.month().unwrap().counts.get(&5), Some(&1));
        assert_eq!(
            calendar.day_progress(),
            DayProgress {
                completed: 1,
                total: 2,
                percent: 50
            }
        );
        assert!(store.done.lock().unwrap().contains(&(read, date(2024, 3, 5))));

        assert!(!calendar.toggle(read).await.unwrap());
        assert!(calendar.month().unwrap().counts.get(&5).is_none());
        assert!(store.done.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_toggle_rolls_back() {
        let (mut calendar, store) = calendar_with(&["Read"]).await;
        let read = habit_id(&calendar, "Read");
        let month_before = calendar.month().cloned();
        let day_before = calendar.day().cloned();

        store.fail_writes(true);
        let result = calendar.toggle(read).await;

        assert!(matches!(result, Err(AppError::TransientIo(_))));
        assert_eq!(calendar.month().cloned(), month_before);
        assert_eq!(calendar.day().cloned(), day_before);
        assert!(store.done.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_untoggle_restores_count() {
        let (mut calendar, store) = calendar_with(&["Read", "Run"]).await;
        let read = habit_id(&calendar, "Read");
        let run = habit_id(&calendar, "Run");
        calendar.toggle(read).await.unwrap();
        calendar.toggle(run).await.unwrap();
        assert_eq!(calendar.month().unwrap().counts.get(&5), Some(&2));

        store.fail_writes(true);
        assert!(calendar.toggle(run).await.is_err());

        assert_eq!(calendar.month().unwrap().counts.get(&5), Some(&2));
        assert!(calendar.day().unwrap().habits.iter().all(|h| h.completed));
    }

    #[tokio::test]
    async fn test_toggle_unknown_habit_is_not_found() {
        let (mut calendar, _) = calendar_with(&["Read"]).await;
        let result = calendar.toggle(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_count_never_goes_negative() {
        let (mut calendar, _) = calendar_with(&["Read"]).await;
        let read = habit_id(&calendar, "Read");

        // Stale snapshot: the habit shows as done but the month has no count
        calendar.day.as_mut().unwrap().habits[0].completed = true;
        assert!(!calendar.toggle(read).await.unwrap());
        assert!(calendar.month().unwrap().counts.get(&5).is_none());
    }

    #[tokio::test]
    async fn test_add_and_remove_habit_reload_everything() {
        let (mut calendar, store) = calendar_with(&["Read"]).await;
        let fetches = store.month_fetches.load(Ordering::SeqCst);

        let walk = calendar.add_habit("Walk").await.unwrap();
        assert_eq!(calendar.month().unwrap().total_habits, 2);
        assert_eq!(calendar.day().unwrap().habits.len(), 2);
        assert_eq!(store.month_fetches.load(Ordering::SeqCst), fetches + 1);

        calendar.remove_habit(walk.id).await.unwrap();
        assert_eq!(calendar.month().unwrap().total_habits, 1);
        assert_eq!(calendar.day().unwrap().habits.len(), 1);
    }

    #[tokio::test]
    async fn test_day_status_classification() {
        let (mut calendar, _) = calendar_with(&["Read", "Run"]).await;
        let read = habit_id(&calendar, "Read");
        let run = habit_id(&calendar, "Run");

        calendar.toggle(read).await.unwrap();
        calendar.toggle(run).await.unwrap();
        calendar.select_date(date(2024, 3, 6)).await.unwrap();
        calendar.toggle(read).await.unwrap();

        assert_eq!(calendar.day_status(5), DayStatus::AllDone);
        assert_eq!(calendar.day_status(6), DayStatus::Partial);
        assert_eq!(calendar.day_status(7), DayStatus::NoneDone);
        // After "today" (2024-03-10)
        assert_eq!(calendar.day_status(11), DayStatus::Unmarked);
        // Not a day of March
        assert_eq!(calendar.day_status(32), DayStatus::Unmarked);
    }

    #[tokio::test]
    async fn test_no_habits_is_unmarked_with_zero_progress() {
        let (calendar, _) = calendar_with(&[]).await;
        assert_eq!(calendar.day_status(1), DayStatus::Unmarked);
        assert_eq!(calendar.day_progress(), DayProgress::default());
    }

    #[tokio::test]
    async fn test_shift_month_keeps_selected_day() {
        let (mut calendar, _) = calendar_with(&["Read"]).await;

        calendar.shift_month(-1).await.unwrap();
        assert_eq!(calendar.month().unwrap().month, 2);
        assert_eq!(calendar.selected_date(), date(2024, 3, 5));

        calendar.shift_month(11).await.unwrap();
        let month = calendar.month().unwrap();
        assert_eq!((month.year, month.month), (2025, 1));
    }

    #[tokio::test]
    async fn test_failed_add_keeps_snapshots() {
        let (mut calendar, store) = calendar_with(&["Read"]).await;
        store.fail_writes(true);

        assert!(calendar.add_habit("Walk").await.is_err());
        assert_eq!(calendar.month().unwrap().total_habits, 1);
    }

    #[tokio::test]
    async fn test_writes_publish_habits_changed() {
        let state = crate::state::tests::test_state();
        let mut events = state.subscribe();
        let store = Arc::new(MemoryStore::default());
        let user_id = Uuid::new_v4();
        let mut calendar =
            HabitCalendar::new(store.clone(), user_id, date(2024, 3, 10)).with_state(state);
        calendar.open(date(2024, 3, 5)).await.unwrap();

        let habit = calendar.add_habit("Read").await.unwrap();
        assert_eq!(events.try_recv().unwrap(), AppEvent::HabitsChanged { user_id });

        calendar.toggle(habit.id).await.unwrap();
        assert_eq!(events.try_recv().unwrap(), AppEvent::HabitsChanged { user_id });

        calendar.remove_habit(habit.id).await.unwrap();
        assert_eq!(events.try_recv().unwrap(), AppEvent::HabitsChanged { user_id });
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_writes_publish_nothing() {
        let state = crate::state::tests::test_state();
        let mut events = state.subscribe();
        let store = Arc::new(MemoryStore::default());
        let user_id = Uuid::new_v4();
        store.create_habit(user_id, "Read").await.unwrap();
        let mut calendar =
            HabitCalendar::new(store.clone(), user_id, date(2024, 3, 10)).with_state(state);
        calendar.open(date(2024, 3, 5)).await.unwrap();
        let read = habit_id(&calendar, "Read");

        store.fail_writes(true);
        assert!(calendar.toggle(read).await.is_err());
        assert!(calendar.add_habit("Walk").await.is_err());
        assert!(events.try_recv().is_err());
    }
}

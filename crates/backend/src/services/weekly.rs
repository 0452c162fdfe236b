//! Weekly snapshots for repeated todos.
//!
//! Each repeated todo has at most one [`WeekSnapshot`] per week, keyed by the
//! Monday of that week. Snapshots are created lazily: the first write of a
//! week (creating the todo, or toggling a day) materializes the row, and reads
//! render an all-false week when no row exists yet. Once a new week starts the
//! previous week's row is never written again, since every write resolves the
//! current Monday first.
//!
//! Creation races are settled by the `(repeated_todo_id, week_start)` unique
//! key: the loser of a concurrent insert re-reads the winner's row.

use chrono::{Datelike, NaiveDate, Weekday};
use shared_types::{week_start, DayKey, RepeatedTodo, RepeatedTodoWithWeek, WeekMap, WeekSnapshot};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Insert hit the `(repeated_todo_id, week_start)` unique key
    #[error("week snapshot already exists")]
    Conflict,

    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

/// Storage operations the snapshot manager needs.
///
/// `insert_blank_snapshot` must report a unique-key violation as
/// [`StoreError::Conflict`] and nothing else as such.
#[allow(async_fn_in_trait)]
pub trait SnapshotStore {
    /// All repeated todos of a user, in display order.
    async fn list_tasks(&mut self, user_id: Uuid) -> Result<Vec<RepeatedTodo>, StoreError>;

    /// Insert a repeated todo at the end of the user's list.
    async fn insert_task(&mut self, user_id: Uuid, title: &str)
        -> Result<RepeatedTodo, StoreError>;

    async fn find_snapshot(
        &mut self,
        task_id: Uuid,
        week_start: NaiveDate,
    ) -> Result<Option<WeekSnapshot>, StoreError>;

    async fn insert_blank_snapshot(
        &mut self,
        task_id: Uuid,
        week_start: NaiveDate,
    ) -> Result<WeekSnapshot, StoreError>;

    /// Greatest `week_start` per task, in one lookup. Tasks without any
    /// snapshot are absent from the map.
    async fn latest_weeks(
        &mut self,
        task_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, NaiveDate>, StoreError>;

    async fn snapshots_for_week(
        &mut self,
        task_ids: &[Uuid],
        week_start: NaiveDate,
    ) -> Result<Vec<WeekSnapshot>, StoreError>;

    /// Flip one day flag of an existing snapshot and return the updated row.
    async fn toggle_snapshot_day(
        &mut self,
        snapshot_id: Uuid,
        day: DayKey,
    ) -> Result<WeekSnapshot, StoreError>;
}

/// Return the snapshot for `(task_id, week)`, creating a blank one if needed.
pub async fn ensure_snapshot<S: SnapshotStore>(
    store: &mut S,
    task_id: Uuid,
    week: NaiveDate,
) -> Result<WeekSnapshot, StoreError> {
    debug_assert_eq!(week.weekday(), Weekday::Mon, "week key must be a Monday");

    if let Some(existing) = store.find_snapshot(task_id, week).await? {
        return Ok(existing);
    }

    match store.insert_blank_snapshot(task_id, week).await {
        Ok(created) => {
            tracing::debug!(%task_id, %week, "Created week snapshot");
            Ok(created)
        }
        Err(StoreError::Conflict) => {
            tracing::debug!(%task_id, %week, "Week snapshot created concurrently, re-reading");
            store
                .find_snapshot(task_id, week)
                .await?
                .ok_or(StoreError::Conflict)
        }
        Err(e) => Err(e),
    }
}

/// Create a repeated todo and its snapshot for `week`.
///
/// The caller runs this in one transaction: any error here must leave no
/// task behind.
pub async fn create_task<S: SnapshotStore>(
    store: &mut S,
    user_id: Uuid,
    title: &str,
    week: NaiveDate,
) -> Result<RepeatedTodo, StoreError> {
    let task = store.insert_task(user_id, title).await?;
    ensure_snapshot(store, task.id, week).await?;
    Ok(task)
}

/// How a user's repeated todos relate to the current week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Todos that already have a snapshot for the current week
    pub current: usize,
    /// Todos whose newest snapshot belongs to a past week
    pub archived: usize,
    /// Todos without any snapshot
    pub untouched: usize,
}

/// Classify every repeated todo of a user against the current week.
///
/// Past weeks are archived implicitly, so this never writes: a todo without
/// a current-week row gets one on its next toggle.
pub async fn archive_past_weeks<S: SnapshotStore>(
    store: &mut S,
    user_id: Uuid,
    today: NaiveDate,
) -> Result<ArchiveReport, StoreError> {
    let current_week = week_start(today);
    let mut report = ArchiveReport::default();

    let task_ids: Vec<Uuid> = store
        .list_tasks(user_id)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();
    let latest = store.latest_weeks(&task_ids).await?;

    for task_id in &task_ids {
        match latest.get(task_id) {
            Some(week) if *week < current_week => report.archived += 1,
            Some(_) => report.current += 1,
            None => report.untouched += 1,
        }
    }

    Ok(report)
}

/// Flip one day of the given week's snapshot, creating the snapshot first if
/// this is the week's first interaction.
pub async fn toggle_day<S: SnapshotStore>(
    store: &mut S,
    task_id: Uuid,
    week: NaiveDate,
    day: DayKey,
) -> Result<WeekSnapshot, StoreError> {
    let snapshot = ensure_snapshot(store, task_id, week).await?;
    let updated = store.toggle_snapshot_day(snapshot.id, day).await?;
    tracing::debug!(
        %task_id,
        %week,
        day = day.as_str(),
        done = updated.week().get(day),
        "Toggled day"
    );
    Ok(updated)
}

/// Repeated todos of a user with the current week's flags.
///
/// Todos without a current-week snapshot show an all-false week; no row is
/// created for them.
pub async fn list_week<S: SnapshotStore>(
    store: &mut S,
    user_id: Uuid,
    today: NaiveDate,
) -> Result<Vec<RepeatedTodoWithWeek>, StoreError> {
    let current_week = week_start(today);
    let tasks = store.list_tasks(user_id).await?;
    let task_ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();

    let weeks: HashMap<Uuid, WeekMap> = store
        .snapshots_for_week(&task_ids, current_week)
        .await?
        .into_iter()
        .map(|s| (s.repeated_todo_id, s.week()))
        .collect();

    Ok(tasks
        .into_iter()
        .map(|task| RepeatedTodoWithWeek {
            week: weeks.get(&task.id).copied().unwrap_or_default(),
            id: task.id,
            title: task.title,
            sort_order: task.sort_order,
        })
        .collect())
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory [`SnapshotStore`] that enforces the same unique key as the
    //! database table.

    use super::*;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    pub struct MemoryState {
        pub tasks: Vec<RepeatedTodo>,
        pub snapshots: Vec<WeekSnapshot>,
        pub writes: usize,
        pub latest_lookups: usize,
    }

    /// A handle on shared state, one per simulated connection.
    #[derive(Clone, Default)]
    pub struct MemoryStore {
        pub state: Arc<Mutex<MemoryState>>,
        /// Number of upcoming `find_snapshot` calls that miss regardless of
        /// state, as if they ran before a concurrent insert committed.
        pub stale_reads: usize,
        /// Error returned by the next insert instead of writing.
        pub failing_insert: Option<fn() -> StoreError>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Another connection on the same state.
        pub fn connection(&self) -> Self {
            MemoryStore {
                state: Arc::clone(&self.state),
                stale_reads: 0,
                failing_insert: None,
            }
        }

        pub fn add_task(&self, user_id: Uuid, title: &str) -> RepeatedTodo {
            let mut state = self.state.lock().unwrap();
            let now = Utc::now();
            let task = RepeatedTodo {
                id: Uuid::new_v4(),
                user_id,
                title: title.to_string(),
                sort_order: state.tasks.iter().map(|t| t.sort_order + 1).max().unwrap_or(0),
                created_at: now,
                updated_at: now,
            };
            state.tasks.push(task.clone());
            task
        }

        pub fn snapshot_count(&self, task_id: Uuid) -> usize {
            let state = self.state.lock().unwrap();
            state
                .snapshots
                .iter()
                .filter(|s| s.repeated_todo_id == task_id)
                .count()
        }

        pub fn snapshot(&self, task_id: Uuid, week: NaiveDate) -> Option<WeekSnapshot> {
            let state = self.state.lock().unwrap();
            state
                .snapshots
                .iter()
                .find(|s| s.repeated_todo_id == task_id && s.week_start == week)
                .cloned()
        }

        pub fn writes(&self) -> usize {
            self.state.lock().unwrap().writes
        }

        pub fn latest_lookups(&self) -> usize {
            self.state.lock().unwrap().latest_lookups
        }
    }

    impl SnapshotStore for MemoryStore {
        async fn list_tasks(&mut self, user_id: Uuid) -> Result<Vec<RepeatedTodo>, StoreError> {
            let state = self.state.lock().unwrap();
            let mut tasks: Vec<RepeatedTodo> = state
                .tasks
                .iter()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect();
            tasks.sort_by_key(|t| (t.sort_order, t.created_at));
            Ok(tasks)
        }

        async fn insert_task(
            &mut self,
            user_id: Uuid,
            title: &str,
        ) -> Result<RepeatedTodo, StoreError> {
            self.state.lock().unwrap().writes += 1;
            Ok(self.add_task(user_id, title))
        }

        async fn find_snapshot(
            &mut self,
            task_id: Uuid,
            week_start: NaiveDate,
        ) -> Result<Option<WeekSnapshot>, StoreError> {
            // Give concurrent callers a chance to interleave.
            tokio::task::yield_now().await;
            if self.stale_reads > 0 {
                self.stale_reads -= 1;
                return Ok(None);
            }
            Ok(self.snapshot(task_id, week_start))
        }

        async fn insert_blank_snapshot(
            &mut self,
            task_id: Uuid,
            week_start: NaiveDate,
        ) -> Result<WeekSnapshot, StoreError> {
            if let Some(make_error) = self.failing_insert.take() {
                return Err(make_error());
            }
            tokio::task::yield_now().await;

            let mut state = self.state.lock().unwrap();
            if state
                .snapshots
                .iter()
                .any(|s| s.repeated_todo_id == task_id && s.week_start == week_start)
            {
                return Err(StoreError::Conflict);
            }
            let now = Utc::now();
            let snapshot = WeekSnapshot {
                id: Uuid::new_v4(),
                repeated_todo_id: task_id,
                week_start,
                mon: false,
                tue: false,
                wed: false,
                thu: false,
                fri: false,
                sat: false,
                sun: false,
                created_at: now,
                updated_at: now,
            };
            state.snapshots.push(snapshot.clone());
            state.writes += 1;
            Ok(snapshot)
        }

        async fn latest_weeks(
            &mut self,
            task_ids: &[Uuid],
        ) -> Result<HashMap<Uuid, NaiveDate>, StoreError> {
            let mut state = self.state.lock().unwrap();
            state.latest_lookups += 1;

            let mut latest: HashMap<Uuid, NaiveDate> = HashMap::new();
            for snapshot in state
                .snapshots
                .iter()
                .filter(|s| task_ids.contains(&s.repeated_todo_id))
            {
                let week = latest.entry(snapshot.repeated_todo_id).or_insert(snapshot.week_start);
                if snapshot.week_start > *week {
                    *week = snapshot.week_start;
                }
            }
            Ok(latest)
        }

        async fn snapshots_for_week(
            &mut self,
            task_ids: &[Uuid],
            week_start: NaiveDate,
        ) -> Result<Vec<WeekSnapshot>, StoreError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .snapshots
                .iter()
                .filter(|s| task_ids.contains(&s.repeated_todo_id) && s.week_start == week_start)
                .cloned()
                .collect())
        }

        async fn toggle_snapshot_day(
            &mut self,
            snapshot_id: Uuid,
            day: DayKey,
        ) -> Result<WeekSnapshot, StoreError> {
            let mut state = self.state.lock().unwrap();
            state.writes += 1;
            let snapshot = state
                .snapshots
                .iter_mut()
                .find(|s| s.id == snapshot_id)
                .ok_or(StoreError::Database(diesel::result::Error::NotFound))?;
            let week = snapshot.week().toggled(day);
            snapshot.mon = week.mon;
            snapshot.tue = week.tue;
            snapshot.wed = week.wed;
            snapshot.thu = week.thu;
            snapshot.fri = week.fri;
            snapshot.sat = week.sat;
            snapshot.sun = week.sun;
            snapshot.updated_at = Utc::now();
            Ok(snapshot.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_ensure_creates_blank_snapshot_once() {
        let mut store = MemoryStore::new();
        let task = store.add_task(Uuid::new_v4(), "Gym");
        let week = date(2026, 2, 2);

        let first = tokio_test::block_on(ensure_snapshot(&mut store, task.id, week)).unwrap();
        assert_eq!(first.week(), WeekMap::default());
        assert_eq!(first.week_start, week);

        let second = tokio_test::block_on(ensure_snapshot(&mut store, task.id, week)).unwrap();
        assert_eq!(second, first);
        assert_eq!(store.snapshot_count(task.id), 1);
    }

    #[test]
    fn test_ensure_recovers_from_lost_race() {
        let store = MemoryStore::new();
        let task = store.add_task(Uuid::new_v4(), "Prayer");
        let week = date(2026, 2, 2);

        // The winner commits first.
        let mut winner = store.connection();
        let won = tokio_test::block_on(ensure_snapshot(&mut winner, task.id, week)).unwrap();

        // The loser read before that commit, so its insert conflicts.
        let mut loser = store.connection();
        loser.stale_reads = 1;
        let lost = tokio_test::block_on(ensure_snapshot(&mut loser, task.id, week)).unwrap();

        assert_eq!(lost.id, won.id);
        assert_eq!(store.snapshot_count(task.id), 1);
    }

    #[test]
    fn test_ensure_propagates_other_storage_errors() {
        let mut store = MemoryStore::new();
        let task = store.add_task(Uuid::new_v4(), "Read");
        store.failing_insert =
            Some(|| StoreError::Database(diesel::result::Error::BrokenTransactionManager));

        let result = tokio_test::block_on(ensure_snapshot(&mut store, task.id, date(2026, 2, 2)));
        assert!(matches!(
            result,
            Err(StoreError::Database(
                diesel::result::Error::BrokenTransactionManager
            ))
        ));
        assert_eq!(store.snapshot_count(task.id), 0);
    }

    #[test]
    fn test_create_task_starts_its_week() {
        let mut store = MemoryStore::new();
        let user = Uuid::new_v4();
        let week = date(2026, 2, 2);

        let task = tokio_test::block_on(create_task(&mut store, user, "Gym", week)).unwrap();
        assert_eq!(task.user_id, user);
        assert_eq!(
            store.snapshot(task.id, week).map(|s| s.week()),
            Some(WeekMap::default())
        );
    }

    #[test]
    fn test_create_task_fails_when_snapshot_insert_fails() {
        let mut store = MemoryStore::new();
        store.failing_insert =
            Some(|| StoreError::Database(diesel::result::Error::BrokenTransactionManager));

        let result = tokio_test::block_on(create_task(
            &mut store,
            Uuid::new_v4(),
            "Gym",
            date(2026, 2, 2),
        ));
        assert!(matches!(result, Err(StoreError::Database(_))));
    }

    #[test]
    fn test_conflict_without_winner_row_is_reported() {
        let mut store = MemoryStore::new();
        let task = store.add_task(Uuid::new_v4(), "Read");
        store.failing_insert = Some(|| StoreError::Conflict);

        let result = tokio_test::block_on(ensure_snapshot(&mut store, task.id, date(2026, 2, 2)));
        assert!(matches!(result, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn test_concurrent_ensure_yields_single_row() {
        let store = MemoryStore::new();
        let task = store.add_task(Uuid::new_v4(), "Gym");
        let week = date(2026, 2, 2);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let mut conn = store.connection();
                conn.stale_reads = 1;
                tokio::spawn(async move { ensure_snapshot(&mut conn, task.id, week).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }

        assert_eq!(store.snapshot_count(task.id), 1);
        assert!(ids.iter().all(|id| *id == ids[0]));
    }

    #[test]
    fn test_toggle_flips_exactly_one_day() {
        let mut store = MemoryStore::new();
        let task = store.add_task(Uuid::new_v4(), "Gym");
        let week = date(2026, 2, 2);

        let on = tokio_test::block_on(toggle_day(&mut store, task.id, week, DayKey::Wed)).unwrap();
        assert_eq!(on.week(), WeekMap::default().toggled(DayKey::Wed));

        let off = tokio_test::block_on(toggle_day(&mut store, task.id, week, DayKey::Wed)).unwrap();
        assert_eq!(off.week(), WeekMap::default());
        assert_eq!(off.id, on.id);
    }

    #[test]
    fn test_gym_across_two_weeks() {
        let mut store = MemoryStore::new();
        let user = Uuid::new_v4();
        let gym = store.add_task(user, "Gym");
        let first_week = date(2026, 2, 2);

        tokio_test::block_on(async {
            let created = ensure_snapshot(&mut store, gym.id, first_week).await.unwrap();
            assert_eq!(created.week(), WeekMap::default());

            toggle_day(&mut store, gym.id, first_week, DayKey::Wed)
                .await
                .unwrap();
            let again = ensure_snapshot(&mut store, gym.id, first_week).await.unwrap();
            assert!(again.wed);
            assert_eq!(again.week().completed_days(), 1);

            let next_week = week_start(date(2026, 2, 9));
            assert_eq!(next_week, date(2026, 2, 9));
            let fresh = ensure_snapshot(&mut store, gym.id, next_week).await.unwrap();
            assert_ne!(fresh.id, created.id);
            assert_eq!(fresh.week(), WeekMap::default());

            toggle_day(&mut store, gym.id, next_week, DayKey::Mon)
                .await
                .unwrap();
        });

        let archived = store.snapshot(gym.id, first_week).unwrap();
        assert!(archived.wed);
        assert_eq!(archived.week().completed_days(), 1);
        assert_eq!(store.snapshot_count(gym.id), 2);
    }

    #[test]
    fn test_listing_does_not_create_snapshots() {
        let mut store = MemoryStore::new();
        let user = Uuid::new_v4();
        let gym = store.add_task(user, "Gym");
        let prayer = store.add_task(user, "Prayer");
        store.add_task(Uuid::new_v4(), "Someone else's");
        let today = date(2026, 2, 4);

        tokio_test::block_on(toggle_day(&mut store, prayer.id, week_start(today), DayKey::Tue))
            .unwrap();
        let writes_before = store.writes();

        let list = tokio_test::block_on(list_week(&mut store, user, today)).unwrap();
        assert_eq!(store.writes(), writes_before);
        assert_eq!(store.snapshot_count(gym.id), 0);

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, gym.id);
        assert_eq!(list[0].week, WeekMap::default());
        assert_eq!(list[1].id, prayer.id);
        assert!(list[1].week.tue);
    }

    #[test]
    fn test_listing_ignores_past_weeks() {
        let mut store = MemoryStore::new();
        let user = Uuid::new_v4();
        let gym = store.add_task(user, "Gym");

        tokio_test::block_on(toggle_day(&mut store, gym.id, date(2026, 2, 2), DayKey::Fri))
            .unwrap();

        let list = tokio_test::block_on(list_week(&mut store, user, date(2026, 2, 10))).unwrap();
        assert_eq!(list[0].week, WeekMap::default());
    }

    #[test]
    fn test_archive_report_never_writes() {
        let mut store = MemoryStore::new();
        let user = Uuid::new_v4();
        let current = store.add_task(user, "Current");
        let stale = store.add_task(user, "Stale");
        store.add_task(user, "Never touched");
        let today = date(2026, 2, 11);

        tokio_test::block_on(async {
            ensure_snapshot(&mut store, current.id, week_start(today))
                .await
                .unwrap();
            ensure_snapshot(&mut store, stale.id, date(2026, 1, 26))
                .await
                .unwrap();
        });
        let writes_before = store.writes();

        let report = tokio_test::block_on(archive_past_weeks(&mut store, user, today)).unwrap();
        assert_eq!(
            report,
            ArchiveReport {
                current: 1,
                archived: 1,
                untouched: 1,
            }
        );
        assert_eq!(store.writes(), writes_before);
        assert!(store.snapshot(stale.id, week_start(today)).is_none());
    }

    #[test]
    fn test_archive_report_uses_one_lookup() {
        let mut store = MemoryStore::new();
        let user = Uuid::new_v4();
        let today = date(2026, 2, 11);
        let tasks: Vec<RepeatedTodo> = (0..5)
            .map(|i| store.add_task(user, &format!("Task {}", i)))
            .collect();

        tokio_test::block_on(async {
            for (i, task) in tasks.iter().enumerate() {
                ensure_snapshot(&mut store, task.id, date(2026, 1, 26)).await.unwrap();
                if i % 2 == 0 {
                    ensure_snapshot(&mut store, task.id, week_start(today)).await.unwrap();
                }
            }
        });

        let report = tokio_test::block_on(archive_past_weeks(&mut store, user, today)).unwrap();
        assert_eq!(report.current, 3);
        assert_eq!(report.archived, 2);
        assert_eq!(store.latest_lookups(), 1);
    }
}

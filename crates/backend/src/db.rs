use anyhow::Context;
use chrono::{NaiveDate, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager, ManagerConfig},
    AsyncPgConnection, RunQueryDsl,
};
use shared_types::{
    Category, DayKey, Idea, Note, Reminder, RepeatedTodo, Todo, TodoStatus, TodoWithCategory,
    WeekSnapshot,
};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::{
    CategoryChanges, IdeaChanges, NewCategory, NewIdea, NewNote, NewReminder, NewRepeatedTodo,
    NewTodo, NewWeekSnapshot, NoteChanges, ReminderChanges, TodoChanges,
};
use crate::services::weekly::{SnapshotStore, StoreError};

pub type DbPool = Pool<AsyncPgConnection>;

async fn establish_tls_connection(config: String) -> diesel::ConnectionResult<AsyncPgConnection> {
    // Set up rustls TLS configuration
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

    // Parse the connection string and connect with TLS
    let (client, connection) = tokio_postgres::connect(&config, tls)
        .await
        .map_err(|e| diesel::ConnectionError::BadConnection(e.to_string()))?;

    // Spawn the connection task
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Connection error: {}", e);
        }
    });

    // Build the async connection from the tokio-postgres client
    AsyncPgConnection::try_from(client).await
}

pub fn establish_connection_pool(config: &AppConfig) -> anyhow::Result<DbPool> {
    let manager = if config.database_tls {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup =
            Box::new(|url| Box::pin(establish_tls_connection(url.to_string())));
        AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
            &config.database_url,
            manager_config,
        )
    } else {
        AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url)
    };

    let pool = Pool::builder(manager)
        .max_size(config.database_pool_size)
        .build()
        .context("Failed to create database pool")?;

    Ok(pool)
}

/// Next free sort position, given the current maximum.
fn next_position(current_max: Option<i32>) -> i32 {
    current_max.map_or(0, |max| max + 1)
}

// Category database operations
pub mod categories {
    use super::*;
    use std::collections::HashMap;

    pub async fn list_for_user(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> QueryResult<Vec<Category>> {
        use crate::schema::categories::dsl::*;

        categories
            .filter(user_id.eq(owner))
            .order_by((sort_order.asc(), name.asc()))
            .load::<Category>(conn)
            .await
    }

    pub async fn find(
        conn: &mut AsyncPgConnection,
        category_id: Uuid,
    ) -> QueryResult<Option<Category>> {
        use crate::schema::categories::dsl::*;

        categories
            .filter(id.eq(category_id))
            .first::<Category>(conn)
            .await
            .optional()
    }

    /// Every category of a user mapped to its parent.
    pub async fn parent_map(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> QueryResult<HashMap<Uuid, Option<Uuid>>> {
        use crate::schema::categories::dsl::*;

        let pairs = categories
            .filter(user_id.eq(owner))
            .select((id, parent_id))
            .load::<(Uuid, Option<Uuid>)>(conn)
            .await?;

        Ok(pairs.into_iter().collect())
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        name_val: &str,
        parent_val: Option<Uuid>,
        color_val: Option<&str>,
    ) -> QueryResult<Category> {
        use crate::schema::categories::dsl::*;

        let max_position: Option<i32> = categories
            .filter(user_id.eq(owner))
            .select(diesel::dsl::max(sort_order))
            .first(conn)
            .await?;

        diesel::insert_into(categories)
            .values(NewCategory {
                user_id: owner,
                parent_id: parent_val,
                name: name_val,
                sort_order: next_position(max_position),
                color: color_val,
            })
            .get_result::<Category>(conn)
            .await
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        category_id: Uuid,
        changes: CategoryChanges<'_>,
    ) -> QueryResult<Category> {
        use crate::schema::categories::dsl::*;

        diesel::update(categories.filter(id.eq(category_id)).filter(user_id.eq(owner)))
            .set(changes)
            .get_result::<Category>(conn)
            .await
    }

    /// Children go with their parent; todos and notes lose the reference.
    pub async fn delete(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        category_id: Uuid,
    ) -> QueryResult<()> {
        use crate::schema::categories::dsl::*;

        diesel::delete(categories.filter(id.eq(category_id)).filter(user_id.eq(owner)))
            .execute(conn)
            .await?;

        Ok(())
    }
}

// Todo database operations
pub mod todos {
    use super::*;
    use crate::schema::{categories, todos};

    fn pair((todo, category): (Todo, Option<Category>)) -> TodoWithCategory {
        TodoWithCategory { todo, category }
    }

    /// Open todos planned for `date` or not tied to any day.
    pub async fn list_open_for_date(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        date: NaiveDate,
    ) -> QueryResult<Vec<TodoWithCategory>> {
        let rows = todos::table
            .left_join(categories::table)
            .filter(todos::user_id.eq(owner))
            .filter(todos::status.ne(TodoStatus::Complete))
            .filter(todos::for_date.eq(date).or(todos::for_date.is_null()))
            .order_by((todos::sort_order.asc(), todos::created_at.asc()))
            .select((todos::all_columns, categories::all_columns.nullable()))
            .load::<(Todo, Option<Category>)>(conn)
            .await?;

        Ok(rows.into_iter().map(pair).collect())
    }

    pub async fn list_completed(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> QueryResult<Vec<TodoWithCategory>> {
        let rows = todos::table
            .left_join(categories::table)
            .filter(todos::user_id.eq(owner))
            .filter(todos::status.eq(TodoStatus::Complete))
            .order_by(todos::updated_at.desc())
            .select((todos::all_columns, categories::all_columns.nullable()))
            .load::<(Todo, Option<Category>)>(conn)
            .await?;

        Ok(rows.into_iter().map(pair).collect())
    }

    pub async fn find(conn: &mut AsyncPgConnection, todo_id: Uuid) -> QueryResult<Option<Todo>> {
        todos::table
            .filter(todos::id.eq(todo_id))
            .first::<Todo>(conn)
            .await
            .optional()
    }

    /// Attach the todo's category for display.
    pub async fn with_category(
        conn: &mut AsyncPgConnection,
        todo: Todo,
    ) -> QueryResult<TodoWithCategory> {
        let category = match todo.category_id {
            Some(category_id) => super::categories::find(conn, category_id).await?,
            None => None,
        };

        Ok(TodoWithCategory { todo, category })
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        title_val: &str,
        category_val: Option<Uuid>,
        for_date_val: NaiveDate,
    ) -> QueryResult<Todo> {
        let max_position: Option<i32> = todos::table
            .filter(todos::user_id.eq(owner))
            .select(diesel::dsl::max(todos::sort_order))
            .first(conn)
            .await?;

        diesel::insert_into(todos::table)
            .values(NewTodo {
                user_id: owner,
                category_id: category_val,
                title: title_val,
                status: TodoStatus::Today,
                sort_order: next_position(max_position),
                for_date: Some(for_date_val),
            })
            .get_result::<Todo>(conn)
            .await
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        todo_id: Uuid,
        changes: TodoChanges<'_>,
    ) -> QueryResult<Todo> {
        diesel::update(
            todos::table
                .filter(todos::id.eq(todo_id))
                .filter(todos::user_id.eq(owner)),
        )
        .set(changes)
        .get_result::<Todo>(conn)
        .await
    }

    pub async fn delete(conn: &mut AsyncPgConnection, owner: Uuid, todo_id: Uuid) -> QueryResult<()> {
        diesel::delete(
            todos::table
                .filter(todos::id.eq(todo_id))
                .filter(todos::user_id.eq(owner)),
        )
        .execute(conn)
        .await?;

        Ok(())
    }
}

// Note database operations
pub mod notes {
    use super::*;

    pub async fn list_for_user(conn: &mut AsyncPgConnection, owner: Uuid) -> QueryResult<Vec<Note>> {
        use crate::schema::notes::dsl::*;

        notes
            .filter(user_id.eq(owner))
            .order_by(updated_at.desc())
            .load::<Note>(conn)
            .await
    }

    pub async fn find(conn: &mut AsyncPgConnection, note_id: Uuid) -> QueryResult<Option<Note>> {
        use crate::schema::notes::dsl::*;

        notes
            .filter(id.eq(note_id))
            .first::<Note>(conn)
            .await
            .optional()
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        title_val: &str,
        content_val: Option<&str>,
        category_val: Option<Uuid>,
    ) -> QueryResult<Note> {
        use crate::schema::notes::dsl::*;

        diesel::insert_into(notes)
            .values(NewNote {
                user_id: owner,
                category_id: category_val,
                title: title_val,
                content: content_val,
            })
            .get_result::<Note>(conn)
            .await
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        note_id: Uuid,
        changes: NoteChanges<'_>,
    ) -> QueryResult<Note> {
        use crate::schema::notes::dsl::*;

        diesel::update(notes.filter(id.eq(note_id)).filter(user_id.eq(owner)))
            .set(changes)
            .get_result::<Note>(conn)
            .await
    }

    pub async fn delete(conn: &mut AsyncPgConnection, owner: Uuid, note_id: Uuid) -> QueryResult<()> {
        use crate::schema::notes::dsl::*;

        diesel::delete(notes.filter(id.eq(note_id)).filter(user_id.eq(owner)))
            .execute(conn)
            .await?;

        Ok(())
    }
}

// Idea database operations
pub mod ideas {
    use super::*;

    pub async fn list_for_user(conn: &mut AsyncPgConnection, owner: Uuid) -> QueryResult<Vec<Idea>> {
        use crate::schema::ideas::dsl::*;

        ideas
            .filter(user_id.eq(owner))
            .order_by(updated_at.desc())
            .load::<Idea>(conn)
            .await
    }

    pub async fn find(conn: &mut AsyncPgConnection, idea_id: Uuid) -> QueryResult<Option<Idea>> {
        use crate::schema::ideas::dsl::*;

        ideas
            .filter(id.eq(idea_id))
            .first::<Idea>(conn)
            .await
            .optional()
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        title_val: &str,
        content_val: Option<&str>,
    ) -> QueryResult<Idea> {
        use crate::schema::ideas::dsl::*;

        diesel::insert_into(ideas)
            .values(NewIdea {
                user_id: owner,
                title: title_val,
                content: content_val,
            })
            .get_result::<Idea>(conn)
            .await
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        idea_id: Uuid,
        changes: IdeaChanges<'_>,
    ) -> QueryResult<Idea> {
        use crate::schema::ideas::dsl::*;

        diesel::update(ideas.filter(id.eq(idea_id)).filter(user_id.eq(owner)))
            .set(changes)
            .get_result::<Idea>(conn)
            .await
    }

    pub async fn delete(conn: &mut AsyncPgConnection, owner: Uuid, idea_id: Uuid) -> QueryResult<()> {
        use crate::schema::ideas::dsl::*;

        diesel::delete(ideas.filter(id.eq(idea_id)).filter(user_id.eq(owner)))
            .execute(conn)
            .await?;

        Ok(())
    }
}

// Reminder database operations
pub mod reminders {
    use super::*;

    /// Manual order first, then permanent reminders ahead of dated ones.
    pub(super) fn list_query(owner: Uuid) -> crate::schema::reminders::BoxedQuery<'static, Pg> {
        use crate::schema::reminders::dsl::*;

        reminders
            .filter(user_id.eq(owner))
            .order_by((
                sort_order.asc(),
                remind_at.is_null().desc(),
                remind_at.asc(),
            ))
            .into_boxed()
    }

    pub async fn list_for_user(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> QueryResult<Vec<Reminder>> {
        list_query(owner).load::<Reminder>(conn).await
    }

    pub async fn find(
        conn: &mut AsyncPgConnection,
        reminder_id: Uuid,
    ) -> QueryResult<Option<Reminder>> {
        use crate::schema::reminders::dsl::*;

        reminders
            .filter(id.eq(reminder_id))
            .first::<Reminder>(conn)
            .await
            .optional()
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        title_val: &str,
        remind_at_val: Option<chrono::DateTime<Utc>>,
    ) -> QueryResult<Reminder> {
        use crate::schema::reminders::dsl::*;

        let max_position: Option<i32> = reminders
            .filter(user_id.eq(owner))
            .select(diesel::dsl::max(sort_order))
            .first(conn)
            .await?;

        diesel::insert_into(reminders)
            .values(NewReminder {
                user_id: owner,
                title: title_val,
                remind_at: remind_at_val,
                sort_order: next_position(max_position),
            })
            .get_result::<Reminder>(conn)
            .await
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        reminder_id: Uuid,
        changes: ReminderChanges<'_>,
    ) -> QueryResult<Reminder> {
        use crate::schema::reminders::dsl::*;

        diesel::update(reminders.filter(id.eq(reminder_id)).filter(user_id.eq(owner)))
            .set(changes)
            .get_result::<Reminder>(conn)
            .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        reminder_id: Uuid,
    ) -> QueryResult<()> {
        use crate::schema::reminders::dsl::*;

        diesel::delete(reminders.filter(id.eq(reminder_id)).filter(user_id.eq(owner)))
            .execute(conn)
            .await?;

        Ok(())
    }
}

// Repeated todo database operations
pub mod repeated_todos {
    use super::*;
    use crate::services::weekly;
    use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection};

    pub async fn list_for_user(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> QueryResult<Vec<RepeatedTodo>> {
        use crate::schema::repeated_todos::dsl::*;

        repeated_todos
            .filter(user_id.eq(owner))
            .order_by((sort_order.asc(), created_at.asc()))
            .load::<RepeatedTodo>(conn)
            .await
    }

    pub async fn find(
        conn: &mut AsyncPgConnection,
        todo_id: Uuid,
    ) -> QueryResult<Option<RepeatedTodo>> {
        use crate::schema::repeated_todos::dsl::*;

        repeated_todos
            .filter(id.eq(todo_id))
            .first::<RepeatedTodo>(conn)
            .await
            .optional()
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        title_val: &str,
    ) -> QueryResult<RepeatedTodo> {
        use crate::schema::repeated_todos::dsl::*;

        let max_position: Option<i32> = repeated_todos
            .filter(user_id.eq(owner))
            .select(diesel::dsl::max(sort_order))
            .first(conn)
            .await?;

        diesel::insert_into(repeated_todos)
            .values(NewRepeatedTodo {
                user_id: owner,
                title: title_val,
                sort_order: next_position(max_position),
            })
            .get_result::<RepeatedTodo>(conn)
            .await
    }

    /// Create a repeated todo and its first week snapshot in one transaction.
    pub async fn create_with_week(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        title_val: String,
        week: NaiveDate,
    ) -> Result<RepeatedTodo, StoreError> {
        conn.transaction::<_, StoreError, _>(|conn| {
            async move { weekly::create_task(conn, owner, &title_val, week).await }.scope_boxed()
        })
        .await
    }

    pub async fn rename(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        todo_id: Uuid,
        title_val: Option<&str>,
    ) -> QueryResult<RepeatedTodo> {
        use crate::schema::repeated_todos::dsl::*;

        let target = repeated_todos.filter(id.eq(todo_id)).filter(user_id.eq(owner));
        match title_val {
            Some(t) => {
                diesel::update(target)
                    .set((title.eq(t), updated_at.eq(Utc::now())))
                    .get_result::<RepeatedTodo>(conn)
                    .await
            }
            None => target.first::<RepeatedTodo>(conn).await,
        }
    }

    /// Week snapshots are removed by the foreign key cascade.
    pub async fn delete(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        todo_id: Uuid,
    ) -> QueryResult<()> {
        use crate::schema::repeated_todos::dsl::*;

        diesel::delete(repeated_todos.filter(id.eq(todo_id)).filter(user_id.eq(owner)))
            .execute(conn)
            .await?;

        Ok(())
    }
}

// Week snapshot database operations
pub mod snapshots {
    use super::*;
    use crate::repository::{RepeatedTodos, Repository};
    use diesel::dsl::{max, not};
    use shared_types::CreateRepeatedTodoRequest;
    use std::collections::HashMap;

    /// Only the `(repeated_todo_id, week_start)` unique violation is a lost
    /// creation race; every other failure stays a database error.
    pub(super) fn insert_error(e: DieselError) -> StoreError {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                StoreError::Conflict
            }
            other => StoreError::Database(other),
        }
    }

    impl SnapshotStore for AsyncPgConnection {
        async fn list_tasks(&mut self, owner: Uuid) -> Result<Vec<RepeatedTodo>, StoreError> {
            Ok(super::repeated_todos::list_for_user(self, owner).await?)
        }

        async fn insert_task(
            &mut self,
            owner: Uuid,
            title: &str,
        ) -> Result<RepeatedTodo, StoreError> {
            let input = CreateRepeatedTodoRequest {
                title: title.to_string(),
            };
            Ok(RepeatedTodos::create(self, owner, input).await?)
        }

        async fn find_snapshot(
            &mut self,
            task: Uuid,
            week: NaiveDate,
        ) -> Result<Option<WeekSnapshot>, StoreError> {
            use crate::schema::repeated_todo_week_snapshots::dsl::*;

            let found = repeated_todo_week_snapshots
                .filter(repeated_todo_id.eq(task))
                .filter(week_start.eq(week))
                .first::<WeekSnapshot>(self)
                .await
                .optional()?;

            Ok(found)
        }

        async fn insert_blank_snapshot(
            &mut self,
            task: Uuid,
            week: NaiveDate,
        ) -> Result<WeekSnapshot, StoreError> {
            use crate::schema::repeated_todo_week_snapshots::dsl::*;

            diesel::insert_into(repeated_todo_week_snapshots)
                .values(NewWeekSnapshot {
                    repeated_todo_id: task,
                    week_start: week,
                })
                .get_result::<WeekSnapshot>(self)
                .await
                .map_err(insert_error)
        }

        async fn latest_weeks(
            &mut self,
            tasks: &[Uuid],
        ) -> Result<HashMap<Uuid, NaiveDate>, StoreError> {
            use crate::schema::repeated_todo_week_snapshots::dsl::*;

            if tasks.is_empty() {
                return Ok(HashMap::new());
            }

            let rows = repeated_todo_week_snapshots
                .filter(repeated_todo_id.eq_any(tasks.to_vec()))
                .group_by(repeated_todo_id)
                .select((repeated_todo_id, max(week_start)))
                .load::<(Uuid, Option<NaiveDate>)>(self)
                .await?;

            Ok(rows
                .into_iter()
                .filter_map(|(task, latest)| latest.map(|week| (task, week)))
                .collect())
        }

        async fn snapshots_for_week(
            &mut self,
            tasks: &[Uuid],
            week: NaiveDate,
        ) -> Result<Vec<WeekSnapshot>, StoreError> {
            use crate::schema::repeated_todo_week_snapshots::dsl::*;

            if tasks.is_empty() {
                return Ok(Vec::new());
            }

            let rows = repeated_todo_week_snapshots
                .filter(repeated_todo_id.eq_any(tasks.to_vec()))
                .filter(week_start.eq(week))
                .load::<WeekSnapshot>(self)
                .await?;

            Ok(rows)
        }

        /// Flips the flag in SQL so concurrent toggles never lose an update.
        async fn toggle_snapshot_day(
            &mut self,
            snapshot_id: Uuid,
            day: DayKey,
        ) -> Result<WeekSnapshot, StoreError> {
            use crate::schema::repeated_todo_week_snapshots::dsl::*;

            let target = repeated_todo_week_snapshots.filter(id.eq(snapshot_id));
            let now = Utc::now();

            let updated = match day {
                DayKey::Mon => {
                    diesel::update(target)
                        .set((mon.eq(not(mon)), updated_at.eq(now)))
                        .get_result::<WeekSnapshot>(self)
                        .await?
                }
                DayKey::Tue => {
                    diesel::update(target)
                        .set((tue.eq(not(tue)), updated_at.eq(now)))
                        .get_result::<WeekSnapshot>(self)
                        .await?
                }
                DayKey::Wed => {
                    diesel::update(target)
                        .set((wed.eq(not(wed)), updated_at.eq(now)))
                        .get_result::<WeekSnapshot>(self)
                        .await?
                }
                DayKey::Thu => {
                    diesel::update(target)
                        .set((thu.eq(not(thu)), updated_at.eq(now)))
                        .get_result::<WeekSnapshot>(self)
                        .await?
                }
                DayKey::Fri => {
                    diesel::update(target)
                        .set((fri.eq(not(fri)), updated_at.eq(now)))
                        .get_result::<WeekSnapshot>(self)
                        .await?
                }
                DayKey::Sat => {
                    diesel::update(target)
                        .set((sat.eq(not(sat)), updated_at.eq(now)))
                        .get_result::<WeekSnapshot>(self)
                        .await?
                }
                DayKey::Sun => {
                    diesel::update(target)
                        .set((sun.eq(not(sun)), updated_at.eq(now)))
                        .get_result::<WeekSnapshot>(self)
                        .await?
                }
            };

            Ok(updated)
        }
    }
}

// Sort position writes for drag-reorder
pub mod positions {
    use super::*;
    use crate::services::ordering::{self, Placement, PositionWriter, ReorderOutcome};
    use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection};

    /// Tables with a user-controlled `sort_order`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SortTable {
        Todos,
        Reminders,
        RepeatedTodos,
    }

    struct TablePositions<'c> {
        conn: &'c mut AsyncPgConnection,
        table: SortTable,
    }

    impl PositionWriter for TablePositions<'_> {
        async fn write_position(&mut self, owner: Uuid, placement: &Placement) -> QueryResult<usize> {
            let now = Utc::now();
            let conn = &mut *self.conn;

            match self.table {
                SortTable::Todos => {
                    use crate::schema::todos::dsl::*;

                    let target = todos
                        .filter(id.eq(placement.id))
                        .filter(user_id.eq(owner));
                    match placement.status {
                        Some(status_val) => {
                            diesel::update(target)
                                .set((
                                    sort_order.eq(placement.sort_order),
                                    status.eq(status_val),
                                    updated_at.eq(now),
                                ))
                                .execute(conn)
                                .await
                        }
                        None => {
                            diesel::update(target)
                                .set((sort_order.eq(placement.sort_order), updated_at.eq(now)))
                                .execute(conn)
                                .await
                        }
                    }
                }
                SortTable::Reminders => {
                    use crate::schema::reminders::dsl::*;

                    diesel::update(reminders.filter(id.eq(placement.id)).filter(user_id.eq(owner)))
                        .set((sort_order.eq(placement.sort_order), updated_at.eq(now)))
                        .execute(conn)
                        .await
                }
                SortTable::RepeatedTodos => {
                    use crate::schema::repeated_todos::dsl::*;

                    diesel::update(
                        repeated_todos
                            .filter(id.eq(placement.id))
                            .filter(user_id.eq(owner)),
                    )
                    .set((sort_order.eq(placement.sort_order), updated_at.eq(now)))
                    .execute(conn)
                    .await
                }
            }
        }
    }

    /// Apply a reorder in a single transaction.
    pub async fn reorder(
        conn: &mut AsyncPgConnection,
        table: SortTable,
        owner: Uuid,
        placements: Vec<Placement>,
    ) -> QueryResult<ReorderOutcome> {
        conn.transaction::<_, DieselError, _>(|conn| {
            async move {
                let mut writer = TablePositions { conn, table };
                ordering::apply(&mut writer, owner, &placements).await
            }
            .scope_boxed()
        })
        .await
    }
}

// Connectivity check for the health endpoint
pub async fn ping(conn: &mut AsyncPgConnection) -> QueryResult<()> {
    diesel::sql_query("SELECT 1").execute(conn).await?;
    Ok(())
}

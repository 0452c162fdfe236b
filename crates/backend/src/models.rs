// Insert and changeset structs for Diesel
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use shared_types::TodoStatus;
use uuid::Uuid;

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategory<'a> {
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: &'a str,
    pub sort_order: i32,
    pub color: Option<&'a str>,
}

/// `None` leaves a column untouched, `Some(None)` writes NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::categories)]
pub struct CategoryChanges<'a> {
    pub name: Option<&'a str>,
    pub parent_id: Option<Option<Uuid>>,
    pub color: Option<Option<&'a str>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::todos)]
pub struct NewTodo<'a> {
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: &'a str,
    pub status: TodoStatus,
    pub sort_order: i32,
    pub for_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::todos)]
pub struct TodoChanges<'a> {
    pub title: Option<&'a str>,
    pub category_id: Option<Option<Uuid>>,
    pub status: Option<TodoStatus>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::notes)]
pub struct NewNote<'a> {
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: &'a str,
    pub content: Option<&'a str>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::notes)]
pub struct NoteChanges<'a> {
    pub title: Option<&'a str>,
    pub content: Option<Option<&'a str>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::ideas)]
pub struct NewIdea<'a> {
    pub user_id: Uuid,
    pub title: &'a str,
    pub content: Option<&'a str>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::ideas)]
pub struct IdeaChanges<'a> {
    pub title: Option<&'a str>,
    pub content: Option<Option<&'a str>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::reminders)]
pub struct NewReminder<'a> {
    pub user_id: Uuid,
    pub title: &'a str,
    pub remind_at: Option<DateTime<Utc>>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::reminders)]
pub struct ReminderChanges<'a> {
    pub title: Option<&'a str>,
    pub remind_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::repeated_todos)]
pub struct NewRepeatedTodo<'a> {
    pub user_id: Uuid,
    pub title: &'a str,
    pub sort_order: i32,
}

/// A fresh week: every day flag starts out false via the column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::repeated_todo_week_snapshots)]
pub struct NewWeekSnapshot {
    pub repeated_todo_id: Uuid,
    pub week_start: NaiveDate,
}

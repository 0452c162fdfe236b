use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[cfg(feature = "diesel")]
mod sql;
pub mod week;

pub use week::{week_start, week_start_of, DayKey, WeekMap};

/// Deserialize a field that distinguishes "absent" from explicit `null`.
///
/// Absent fields stay `None` through `#[serde(default)]`; a present `null`
/// becomes `Some(None)`, which clears a nullable column.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Titles and names must contain something besides whitespace.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// ============================================================================
// Categories
// ============================================================================

/// Category struct matching database column order exactly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub sort_order: i32,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category with its nested children, as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub name: String,
    pub parent_id: Option<Uuid>,
    #[validate(length(max = 20))]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `null` moves the category to the top level.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<Option<Uuid>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<Option<String>>,
}

// ============================================================================
// Todos
// ============================================================================

/// Where a todo sits on the board. Stored as VARCHAR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "diesel", derive(diesel::AsExpression, diesel::FromSqlRow))]
#[cfg_attr(feature = "diesel", diesel(sql_type = diesel::sql_types::Text))]
pub enum TodoStatus {
    Today,
    Pending,
    Complete,
    UnderProcess,
}

impl TodoStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TodoStatus::Today => "today",
            TodoStatus::Pending => "pending",
            TodoStatus::Complete => "complete",
            TodoStatus::UnderProcess => "under_process",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "today" => Some(TodoStatus::Today),
            "pending" => Some(TodoStatus::Pending),
            "complete" => Some(TodoStatus::Complete),
            "under_process" => Some(TodoStatus::UnderProcess),
            _ => None,
        }
    }
}

/// Todo struct matching database column order exactly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub status: TodoStatus,
    pub sort_order: i32,
    pub for_date: Option<NaiveDate>, // which day this todo is for
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A todo with its category embedded for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoWithCategory {
    #[serde(flatten)]
    pub todo: Todo,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTodoRequest {
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub title: String,
    pub category_id: Option<Uuid>,
    pub for_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTodoRequest {
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TodoStatus>,
}

/// Query parameters for listing todos
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoListQuery {
    /// Only completed todos, most recently updated first.
    #[serde(default)]
    pub completed: bool,
    /// Day to list; defaults to today.
    pub for_date: Option<NaiveDate>,
}

/// Drag-reorder of the todo board. Positions before `pending_start_index`
/// are in progress, the rest are pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderTodosRequest {
    pub order: Vec<Uuid>,
    pub pending_start_index: usize,
}

// ============================================================================
// Notes and ideas
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub content: Option<String>, // rich-text HTML
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNoteRequest {
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub title: String,
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct Idea {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateIdeaRequest {
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub title: String,
    pub content: Option<String>,
}

/// Update body shared by notes and ideas.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTextEntryRequest {
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<Option<String>>,
}

// ============================================================================
// Reminders
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub remind_at: Option<DateTime<Utc>>, // None = permanent reminder
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReminderRequest {
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub title: String,
    pub remind_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateReminderRequest {
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub remind_at: Option<Option<DateTime<Utc>>>,
}

// ============================================================================
// Recurring todos
// ============================================================================

/// A permanently repeating task (e.g. "Gym")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct RepeatedTodo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Completion record of one repeated todo for one week.
/// `week_start` is always a Monday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct WeekSnapshot {
    pub id: Uuid,
    pub repeated_todo_id: Uuid,
    pub week_start: NaiveDate,
    pub mon: bool,
    pub tue: bool,
    pub wed: bool,
    pub thu: bool,
    pub fri: bool,
    pub sat: bool,
    pub sun: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeekSnapshot {
    pub fn week(&self) -> WeekMap {
        WeekMap {
            mon: self.mon,
            tue: self.tue,
            wed: self.wed,
            thu: self.thu,
            fri: self.fri,
            sat: self.sat,
            sun: self.sun,
        }
    }
}

/// List item for the recurring todo panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatedTodoWithWeek {
    pub id: Uuid,
    pub title: String,
    pub sort_order: i32,
    pub week: WeekMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRepeatedTodoRequest {
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRepeatedTodoRequest {
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleDayRequest {
    pub day: DayKey,
}

// ============================================================================
// Shared
// ============================================================================

/// Body of a plain reorder request (reminders, repeated todos)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn ok() -> Self {
        MessageResponse {
            message: "OK".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_status_wire_format() {
        let json = serde_json::to_string(&TodoStatus::UnderProcess).unwrap();
        assert_eq!(json, "\"under_process\"");

        for status in [
            TodoStatus::Today,
            TodoStatus::Pending,
            TodoStatus::Complete,
            TodoStatus::UnderProcess,
        ] {
            assert_eq!(TodoStatus::from_str(status.as_str()), Some(status));
        }
        assert!(serde_json::from_str::<TodoStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let absent: UpdateTodoRequest = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.category_id, None);

        let cleared: UpdateTodoRequest = serde_json::from_str(r#"{"category_id":null}"#).unwrap();
        assert_eq!(cleared.category_id, Some(None));

        let id = Uuid::new_v4();
        let set: UpdateTodoRequest =
            serde_json::from_str(&format!(r#"{{"category_id":"{}"}}"#, id)).unwrap();
        assert_eq!(set.category_id, Some(Some(id)));
    }

    #[test]
    fn test_title_validation() {
        let empty = CreateRepeatedTodoRequest {
            title: String::new(),
        };
        assert!(empty.validate().is_err());

        let long = CreateRepeatedTodoRequest {
            title: "x".repeat(256),
        };
        assert!(long.validate().is_err());

        let ok = CreateRepeatedTodoRequest {
            title: "Gym".to_string(),
        };
        assert!(ok.validate().is_ok());

        let no_title = UpdateRepeatedTodoRequest { title: None };
        assert!(no_title.validate().is_ok());
    }

    #[test]
    fn test_whitespace_title_is_rejected() {
        let blank = CreateRepeatedTodoRequest {
            title: "   ".to_string(),
        };
        let errors = blank.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));

        let rename = UpdateRepeatedTodoRequest {
            title: Some("\t\n".to_string()),
        };
        assert!(rename.validate().is_err());

        let todo = CreateTodoRequest {
            title: " ".to_string(),
            category_id: None,
            for_date: None,
        };
        assert!(todo.validate().is_err());

        let category = UpdateCategoryRequest {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(category.validate().is_err());

        let padded = CreateRepeatedTodoRequest {
            title: "  Gym ".to_string(),
        };
        assert!(padded.validate().is_ok());
    }

    #[test]
    fn test_toggle_request_rejects_unknown_day() {
        let ok: ToggleDayRequest = serde_json::from_str(r#"{"day":"wed"}"#).unwrap();
        assert_eq!(ok.day, DayKey::Wed);
        assert!(serde_json::from_str::<ToggleDayRequest>(r#"{"day":"someday"}"#).is_err());
    }

    #[test]
    fn test_snapshot_week_map() {
        let now = Utc::now();
        let snapshot = WeekSnapshot {
            id: Uuid::new_v4(),
            repeated_todo_id: Uuid::new_v4(),
            week_start: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            mon: false,
            tue: false,
            wed: true,
            thu: false,
            fri: false,
            sat: false,
            sun: true,
            created_at: now,
            updated_at: now,
        };
        let week = snapshot.week();
        assert!(week.wed && week.sun);
        assert_eq!(week.completed_days(), 2);
    }
}

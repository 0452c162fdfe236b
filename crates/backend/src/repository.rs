//! User-scoped repository traits over the per-entity db modules.
//!
//! Every entity belongs to exactly one user. The traits here give the
//! handlers one shape for lookup, ownership checks, CRUD and reordering,
//! while entity-specific queries stay in [`crate::db`].

use chrono::Utc;
use diesel::QueryResult;
use diesel_async::AsyncPgConnection;
use shared_types::{
    Category, CreateCategoryRequest, CreateIdeaRequest, CreateNoteRequest, CreateReminderRequest,
    CreateRepeatedTodoRequest, CreateTodoRequest, Idea, Note, Reminder, RepeatedTodo, Todo,
    UpdateCategoryRequest, UpdateReminderRequest, UpdateRepeatedTodoRequest,
    UpdateTextEntryRequest, UpdateTodoRequest,
};
use uuid::Uuid;

use crate::db::{self, positions::SortTable};
use crate::error::{ApiError, ApiResult};
use crate::models::{CategoryChanges, IdeaChanges, NoteChanges, ReminderChanges, TodoChanges};
use crate::services::{
    self,
    ordering::{Placement, ReorderOutcome},
};

/// Rows that belong to a single user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

macro_rules! impl_owned {
    ($($ty:ty),* $(,)?) => {
        $(impl Owned for $ty {
            fn owner_id(&self) -> Uuid {
                self.user_id
            }
        })*
    };
}

impl_owned!(Category, Todo, Note, Idea, Reminder, RepeatedTodo);

/// Core repository operations, always on behalf of `owner`.
///
/// `update` and `delete` are filtered by owner as well as id, so a foreign
/// id affects nothing; callers resolve ownership with [`find_owned`] or
/// [`find_visible`] first to report a proper error.
#[allow(async_fn_in_trait)]
pub trait Repository {
    /// The domain entity type returned from database queries
    type Entity: Owned;

    /// Input type for creating new entities
    type CreateInput;

    /// Input type for updating existing entities
    type UpdateInput;

    /// Used in error messages
    const RESOURCE: &'static str;

    async fn find(conn: &mut AsyncPgConnection, id: Uuid) -> QueryResult<Option<Self::Entity>>;

    async fn create(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        input: Self::CreateInput,
    ) -> QueryResult<Self::Entity>;

    async fn update(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        id: Uuid,
        input: Self::UpdateInput,
    ) -> QueryResult<Self::Entity>;

    async fn delete(conn: &mut AsyncPgConnection, owner: Uuid, id: Uuid) -> QueryResult<()>;
}

/// Entities listed as a flat collection per user.
#[allow(async_fn_in_trait)]
pub trait Listable: Repository {
    async fn list_for_user(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> QueryResult<Vec<Self::Entity>>;
}

/// Entities with a user-controlled `sort_order`.
#[allow(async_fn_in_trait)]
pub trait Reorderable: Repository {
    const TABLE: SortTable;

    async fn reorder(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        placements: Vec<Placement>,
    ) -> QueryResult<ReorderOutcome> {
        db::positions::reorder(conn, Self::TABLE, owner, placements).await
    }
}

/// Reject entities owned by someone else with 403.
pub fn check_owner<T: Owned>(entity: T, user_id: Uuid) -> ApiResult<T> {
    if entity.owner_id() == user_id {
        Ok(entity)
    } else {
        Err(ApiError::forbidden("You do not own this resource"))
    }
}

/// Load an entity the caller owns: 404 when missing, 403 when foreign.
pub async fn find_owned<R: Repository>(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
    id: Uuid,
) -> ApiResult<R::Entity> {
    let entity = R::find(conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found(R::RESOURCE))?;
    check_owner(entity, user_id)
}

/// Load an entity the caller owns, hiding foreign rows behind 404.
pub async fn find_visible<R: Repository>(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
    id: Uuid,
) -> ApiResult<R::Entity> {
    R::find(conn, id)
        .await?
        .filter(|entity| entity.owner_id() == user_id)
        .ok_or_else(|| ApiError::not_found(R::RESOURCE))
}

/// Categories repository implementation
pub struct Categories;

impl Repository for Categories {
    type Entity = Category;
    type CreateInput = CreateCategoryRequest;
    type UpdateInput = UpdateCategoryRequest;

    const RESOURCE: &'static str = "Category";

    async fn find(conn: &mut AsyncPgConnection, id: Uuid) -> QueryResult<Option<Category>> {
        db::categories::find(conn, id).await
    }

    async fn create(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        input: CreateCategoryRequest,
    ) -> QueryResult<Category> {
        db::categories::create(
            conn,
            owner,
            &input.name,
            input.parent_id,
            input.color.as_deref(),
        )
        .await
    }

    async fn update(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        id: Uuid,
        input: UpdateCategoryRequest,
    ) -> QueryResult<Category> {
        let changes = CategoryChanges {
            name: input.name.as_deref(),
            parent_id: input.parent_id,
            color: input.color.as_ref().map(|c| c.as_deref()),
            updated_at: Utc::now(),
        };
        db::categories::update(conn, owner, id, changes).await
    }

    async fn delete(conn: &mut AsyncPgConnection, owner: Uuid, id: Uuid) -> QueryResult<()> {
        db::categories::delete(conn, owner, id).await
    }
}

impl Listable for Categories {
    async fn list_for_user(conn: &mut AsyncPgConnection, owner: Uuid) -> QueryResult<Vec<Category>> {
        db::categories::list_for_user(conn, owner).await
    }
}

/// Todos repository implementation. Listing is per day, see [`db::todos`].
pub struct Todos;

impl Repository for Todos {
    type Entity = Todo;
    type CreateInput = CreateTodoRequest;
    type UpdateInput = UpdateTodoRequest;

    const RESOURCE: &'static str = "Todo";

    async fn find(conn: &mut AsyncPgConnection, id: Uuid) -> QueryResult<Option<Todo>> {
        db::todos::find(conn, id).await
    }

    /// A missing `for_date` means today.
    async fn create(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        input: CreateTodoRequest,
    ) -> QueryResult<Todo> {
        let for_date = input.for_date.unwrap_or_else(services::today);
        db::todos::create(conn, owner, &input.title, input.category_id, for_date).await
    }

    async fn update(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        id: Uuid,
        input: UpdateTodoRequest,
    ) -> QueryResult<Todo> {
        let changes = TodoChanges {
            title: input.title.as_deref(),
            category_id: input.category_id,
            status: input.status,
            updated_at: Utc::now(),
        };
        db::todos::update(conn, owner, id, changes).await
    }

    async fn delete(conn: &mut AsyncPgConnection, owner: Uuid, id: Uuid) -> QueryResult<()> {
        db::todos::delete(conn, owner, id).await
    }
}

impl Reorderable for Todos {
    const TABLE: SortTable = SortTable::Todos;
}

/// Notes repository implementation
pub struct Notes;

impl Repository for Notes {
    type Entity = Note;
    type CreateInput = CreateNoteRequest;
    type UpdateInput = UpdateTextEntryRequest;

    const RESOURCE: &'static str = "Note";

    async fn find(conn: &mut AsyncPgConnection, id: Uuid) -> QueryResult<Option<Note>> {
        db::notes::find(conn, id).await
    }

    async fn create(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        input: CreateNoteRequest,
    ) -> QueryResult<Note> {
        db::notes::create(
            conn,
            owner,
            &input.title,
            input.content.as_deref(),
            input.category_id,
        )
        .await
    }

    async fn update(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        id: Uuid,
        input: UpdateTextEntryRequest,
    ) -> QueryResult<Note> {
        let changes = NoteChanges {
            title: input.title.as_deref(),
            content: input.content.as_ref().map(|c| c.as_deref()),
            updated_at: Utc::now(),
        };
        db::notes::update(conn, owner, id, changes).await
    }

    async fn delete(conn: &mut AsyncPgConnection, owner: Uuid, id: Uuid) -> QueryResult<()> {
        db::notes::delete(conn, owner, id).await
    }
}

impl Listable for Notes {
    async fn list_for_user(conn: &mut AsyncPgConnection, owner: Uuid) -> QueryResult<Vec<Note>> {
        db::notes::list_for_user(conn, owner).await
    }
}

/// Ideas repository implementation
pub struct Ideas;

impl Repository for Ideas {
    type Entity = Idea;
    type CreateInput = CreateIdeaRequest;
    type UpdateInput = UpdateTextEntryRequest;

    const RESOURCE: &'static str = "Idea";

    async fn find(conn: &mut AsyncPgConnection, id: Uuid) -> QueryResult<Option<Idea>> {
        db::ideas::find(conn, id).await
    }

    async fn create(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        input: CreateIdeaRequest,
    ) -> QueryResult<Idea> {
        db::ideas::create(conn, owner, &input.title, input.content.as_deref()).await
    }

    async fn update(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        id: Uuid,
        input: UpdateTextEntryRequest,
    ) -> QueryResult<Idea> {
        let changes = IdeaChanges {
            title: input.title.as_deref(),
            content: input.content.as_ref().map(|c| c.as_deref()),
            updated_at: Utc::now(),
        };
        db::ideas::update(conn, owner, id, changes).await
    }

    async fn delete(conn: &mut AsyncPgConnection, owner: Uuid, id: Uuid) -> QueryResult<()> {
        db::ideas::delete(conn, owner, id).await
    }
}

impl Listable for Ideas {
    async fn list_for_user(conn: &mut AsyncPgConnection, owner: Uuid) -> QueryResult<Vec<Idea>> {
        db::ideas::list_for_user(conn, owner).await
    }
}

/// Reminders repository implementation
pub struct Reminders;

impl Repository for Reminders {
    type Entity = Reminder;
    type CreateInput = CreateReminderRequest;
    type UpdateInput = UpdateReminderRequest;

    const RESOURCE: &'static str = "Reminder";

    async fn find(conn: &mut AsyncPgConnection, id: Uuid) -> QueryResult<Option<Reminder>> {
        db::reminders::find(conn, id).await
    }

    async fn create(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        input: CreateReminderRequest,
    ) -> QueryResult<Reminder> {
        db::reminders::create(conn, owner, &input.title, input.remind_at).await
    }

    async fn update(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        id: Uuid,
        input: UpdateReminderRequest,
    ) -> QueryResult<Reminder> {
        let changes = ReminderChanges {
            title: input.title.as_deref(),
            remind_at: input.remind_at,
            updated_at: Utc::now(),
        };
        db::reminders::update(conn, owner, id, changes).await
    }

    async fn delete(conn: &mut AsyncPgConnection, owner: Uuid, id: Uuid) -> QueryResult<()> {
        db::reminders::delete(conn, owner, id).await
    }
}

impl Listable for Reminders {
    async fn list_for_user(conn: &mut AsyncPgConnection, owner: Uuid) -> QueryResult<Vec<Reminder>> {
        db::reminders::list_for_user(conn, owner).await
    }
}

impl Reorderable for Reminders {
    const TABLE: SortTable = SortTable::Reminders;
}

/// Repeated todos repository implementation. Listing goes through the
/// weekly snapshot manager.
pub struct RepeatedTodos;

impl Repository for RepeatedTodos {
    type Entity = RepeatedTodo;
    type CreateInput = CreateRepeatedTodoRequest;
    type UpdateInput = UpdateRepeatedTodoRequest;

    const RESOURCE: &'static str = "Repeated todo";

    async fn find(conn: &mut AsyncPgConnection, id: Uuid) -> QueryResult<Option<RepeatedTodo>> {
        db::repeated_todos::find(conn, id).await
    }

    async fn create(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        input: CreateRepeatedTodoRequest,
    ) -> QueryResult<RepeatedTodo> {
        db::repeated_todos::create(conn, owner, &input.title).await
    }

    async fn update(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        id: Uuid,
        input: UpdateRepeatedTodoRequest,
    ) -> QueryResult<RepeatedTodo> {
        db::repeated_todos::rename(conn, owner, id, input.title.as_deref()).await
    }

    async fn delete(conn: &mut AsyncPgConnection, owner: Uuid, id: Uuid) -> QueryResult<()> {
        db::repeated_todos::delete(conn, owner, id).await
    }
}

impl Reorderable for RepeatedTodos {
    const TABLE: SortTable = SortTable::RepeatedTodos;
}

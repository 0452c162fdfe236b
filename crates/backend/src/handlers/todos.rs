use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
};
use shared_types::{
    CreateTodoRequest, MessageResponse, ReorderTodosRequest, TodoListQuery, TodoWithCategory,
    UpdateTodoRequest,
};
use uuid::Uuid;
use validator::Validate;

use super::ApiJson;
use crate::auth::AuthUser;
use crate::db::{self, DbPool};
use crate::error::ApiResult;
use crate::repository::{find_owned, Categories, Reorderable, Repository, Todos};
use crate::services::{self, ordering};

/// Open todos for a day (default today), or every completed todo.
pub async fn list_todos(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<TodoListQuery>,
) -> ApiResult<Json<Vec<TodoWithCategory>>> {
    let mut conn = pool.get().await?;

    let todos = if query.completed {
        db::todos::list_completed(&mut conn, user.id).await?
    } else {
        let date = query.for_date.unwrap_or_else(services::today);
        db::todos::list_open_for_date(&mut conn, user.id, date).await?
    };

    Ok(Json(todos))
}

pub async fn create_todo(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateTodoRequest>,
) -> ApiResult<(StatusCode, Json<TodoWithCategory>)> {
    payload.validate()?;
    let mut conn = pool.get().await?;

    if let Some(category_id) = payload.category_id {
        find_owned::<Categories>(&mut conn, user.id, category_id).await?;
    }

    let todo = Todos::create(&mut conn, user.id, payload).await?;
    let todo = db::todos::with_category(&mut conn, todo).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateTodoRequest>,
) -> ApiResult<Json<TodoWithCategory>> {
    payload.validate()?;
    let mut conn = pool.get().await?;

    find_owned::<Todos>(&mut conn, user.id, id).await?;
    if let Some(Some(category_id)) = payload.category_id {
        find_owned::<Categories>(&mut conn, user.id, category_id).await?;
    }

    let todo = Todos::update(&mut conn, user.id, id, payload).await?;
    let todo = db::todos::with_category(&mut conn, todo).await?;
    Ok(Json(todo))
}

pub async fn delete_todo(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = pool.get().await?;

    find_owned::<Todos>(&mut conn, user.id, id).await?;
    Todos::delete(&mut conn, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Board drag-reorder: sets positions and the in-progress/pending split.
pub async fn reorder_todos(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<ReorderTodosRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let mut conn = pool.get().await?;

    let placements = ordering::todo_placements(&payload.order, payload.pending_start_index);
    let outcome = Todos::reorder(&mut conn, user.id, placements).await?;
    tracing::debug!(user_id = %user.id, updated = outcome.updated, "Reordered todos");

    Ok(Json(MessageResponse::ok()))
}

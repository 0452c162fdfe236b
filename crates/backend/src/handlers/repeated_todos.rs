use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use shared_types::{
    CreateRepeatedTodoRequest, MessageResponse, RepeatedTodo, RepeatedTodoWithWeek,
    ReorderRequest, ToggleDayRequest, UpdateRepeatedTodoRequest, WeekSnapshot,
};
use uuid::Uuid;
use validator::Validate;

use super::ApiJson;
use crate::auth::AuthUser;
use crate::db::{self, DbPool};
use crate::error::ApiResult;
use crate::repository::{find_owned, RepeatedTodos, Reorderable, Repository};
use crate::services::{self, ordering, weekly};

/// Repeated todos with this week's checkmarks.
pub async fn list_repeated_todos(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<RepeatedTodoWithWeek>>> {
    let mut conn = pool.get().await?;
    let today = services::today();

    let report = weekly::archive_past_weeks(&mut *conn, user.id, today).await?;
    tracing::debug!(
        user_id = %user.id,
        current = report.current,
        archived = report.archived,
        untouched = report.untouched,
        "Checked repeated todo weeks"
    );

    let todos = weekly::list_week(&mut *conn, user.id, today).await?;
    Ok(Json(todos))
}

pub async fn create_repeated_todo(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateRepeatedTodoRequest>,
) -> ApiResult<(StatusCode, Json<RepeatedTodo>)> {
    payload.validate()?;
    let mut conn = pool.get().await?;

    let todo = db::repeated_todos::create_with_week(
        &mut conn,
        user.id,
        payload.title,
        services::current_week(),
    )
    .await?;

    tracing::info!(user_id = %user.id, todo_id = %todo.id, "Created repeated todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_repeated_todo(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateRepeatedTodoRequest>,
) -> ApiResult<Json<RepeatedTodo>> {
    payload.validate()?;
    let mut conn = pool.get().await?;

    find_owned::<RepeatedTodos>(&mut conn, user.id, id).await?;
    let todo = RepeatedTodos::update(&mut conn, user.id, id, payload).await?;
    Ok(Json(todo))
}

pub async fn delete_repeated_todo(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = pool.get().await?;

    find_owned::<RepeatedTodos>(&mut conn, user.id, id).await?;
    RepeatedTodos::delete(&mut conn, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder_repeated_todos(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<ReorderRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let mut conn = pool.get().await?;

    RepeatedTodos::reorder(&mut conn, user.id, ordering::placements(&payload.order)).await?;
    Ok(Json(MessageResponse::ok()))
}

/// Flip one day of the current week, creating the week's row on first use.
pub async fn toggle_day(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<ToggleDayRequest>,
) -> ApiResult<Json<WeekSnapshot>> {
    let mut conn = pool.get().await?;

    find_owned::<RepeatedTodos>(&mut conn, user.id, id).await?;
    let snapshot =
        weekly::toggle_day(&mut *conn, id, services::current_week(), payload.day).await?;
    Ok(Json(snapshot))
}

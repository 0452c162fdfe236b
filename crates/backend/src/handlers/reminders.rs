use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use shared_types::{
    CreateReminderRequest, MessageResponse, Reminder, ReorderRequest, UpdateReminderRequest,
};
use uuid::Uuid;
use validator::Validate;

use super::ApiJson;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::repository::{find_owned, Listable, Reminders, Reorderable, Repository};
use crate::services::ordering;

pub async fn list_reminders(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Reminder>>> {
    let mut conn = pool.get().await?;
    Ok(Json(Reminders::list_for_user(&mut conn, user.id).await?))
}

pub async fn create_reminder(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateReminderRequest>,
) -> ApiResult<(StatusCode, Json<Reminder>)> {
    payload.validate()?;
    let mut conn = pool.get().await?;

    let reminder = Reminders::create(&mut conn, user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

pub async fn update_reminder(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateReminderRequest>,
) -> ApiResult<Json<Reminder>> {
    payload.validate()?;
    let mut conn = pool.get().await?;

    find_owned::<Reminders>(&mut conn, user.id, id).await?;
    let reminder = Reminders::update(&mut conn, user.id, id, payload).await?;
    Ok(Json(reminder))
}

pub async fn delete_reminder(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = pool.get().await?;

    find_owned::<Reminders>(&mut conn, user.id, id).await?;
    Reminders::delete(&mut conn, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder_reminders(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<ReorderRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let mut conn = pool.get().await?;

    Reminders::reorder(&mut conn, user.id, ordering::placements(&payload.order)).await?;
    Ok(Json(MessageResponse::ok()))
}

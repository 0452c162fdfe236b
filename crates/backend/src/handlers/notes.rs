use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use shared_types::{CreateNoteRequest, Note, UpdateTextEntryRequest};
use uuid::Uuid;
use validator::Validate;

use super::ApiJson;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::repository::{find_owned, find_visible, Categories, Listable, Notes, Repository};

pub async fn list_notes(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Note>>> {
    let mut conn = pool.get().await?;
    Ok(Json(Notes::list_for_user(&mut conn, user.id).await?))
}

pub async fn get_note(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Note>> {
    let mut conn = pool.get().await?;
    Ok(Json(find_visible::<Notes>(&mut conn, user.id, id).await?))
}

pub async fn create_note(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateNoteRequest>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    payload.validate()?;
    let mut conn = pool.get().await?;

    if let Some(category_id) = payload.category_id {
        find_owned::<Categories>(&mut conn, user.id, category_id).await?;
    }

    let note = Notes::create(&mut conn, user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn update_note(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateTextEntryRequest>,
) -> ApiResult<Json<Note>> {
    payload.validate()?;
    let mut conn = pool.get().await?;

    find_visible::<Notes>(&mut conn, user.id, id).await?;
    let note = Notes::update(&mut conn, user.id, id, payload).await?;
    Ok(Json(note))
}

pub async fn delete_note(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = pool.get().await?;

    find_visible::<Notes>(&mut conn, user.id, id).await?;
    Notes::delete(&mut conn, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

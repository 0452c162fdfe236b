use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use shared_types::{CreateIdeaRequest, Idea, UpdateTextEntryRequest};
use uuid::Uuid;
use validator::Validate;

use super::ApiJson;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::repository::{find_visible, Ideas, Listable, Repository};

pub async fn list_ideas(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Idea>>> {
    let mut conn = pool.get().await?;
    Ok(Json(Ideas::list_for_user(&mut conn, user.id).await?))
}

pub async fn get_idea(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Idea>> {
    let mut conn = pool.get().await?;
    Ok(Json(find_visible::<Ideas>(&mut conn, user.id, id).await?))
}

pub async fn create_idea(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateIdeaRequest>,
) -> ApiResult<(StatusCode, Json<Idea>)> {
    payload.validate()?;
    let mut conn = pool.get().await?;

    let idea = Ideas::create(&mut conn, user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(idea)))
}

pub async fn update_idea(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateTextEntryRequest>,
) -> ApiResult<Json<Idea>> {
    payload.validate()?;
    let mut conn = pool.get().await?;

    find_visible::<Ideas>(&mut conn, user.id, id).await?;
    let idea = Ideas::update(&mut conn, user.id, id, payload).await?;
    Ok(Json(idea))
}

pub async fn delete_idea(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = pool.get().await?;

    find_visible::<Ideas>(&mut conn, user.id, id).await?;
    Ideas::delete(&mut conn, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

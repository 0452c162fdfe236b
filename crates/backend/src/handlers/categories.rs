use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use shared_types::{Category, CategoryNode, CreateCategoryRequest, UpdateCategoryRequest};
use uuid::Uuid;
use validator::Validate;

use super::ApiJson;
use crate::auth::AuthUser;
use crate::db::{self, DbPool};
use crate::error::{ApiError, ApiResult};
use crate::repository::{find_owned, Categories, Listable, Repository};
use crate::services::category_tree;

const MAX_COLOR_LEN: usize = 20;

/// The caller's categories as a tree of roots.
pub async fn list_categories(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<CategoryNode>>> {
    let mut conn = pool.get().await?;

    let categories = Categories::list_for_user(&mut conn, user.id).await?;
    Ok(Json(category_tree::build_tree(categories)))
}

pub async fn get_category(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Category>> {
    let mut conn = pool.get().await?;

    let category = find_owned::<Categories>(&mut conn, user.id, id).await?;
    Ok(Json(category))
}

pub async fn create_category(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    payload.validate()?;
    let mut conn = pool.get().await?;

    if let Some(parent_id) = payload.parent_id {
        find_owned::<Categories>(&mut conn, user.id, parent_id).await?;
    }

    let category = Categories::create(&mut conn, user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateCategoryRequest>,
) -> ApiResult<Json<Category>> {
    payload.validate()?;
    if let Some(Some(color)) = &payload.color {
        if color.chars().count() > MAX_COLOR_LEN {
            return Err(ApiError::bad_request(format!(
                "color must be at most {} characters",
                MAX_COLOR_LEN
            )));
        }
    }

    let mut conn = pool.get().await?;
    find_owned::<Categories>(&mut conn, user.id, id).await?;

    if let Some(Some(parent_id)) = payload.parent_id {
        if parent_id == id {
            return Err(ApiError::bad_request("A category cannot be its own parent"));
        }
        find_owned::<Categories>(&mut conn, user.id, parent_id).await?;

        let parents = db::categories::parent_map(&mut conn, user.id).await?;
        if category_tree::creates_cycle(&parents, id, parent_id) {
            return Err(ApiError::bad_request(
                "A category cannot be moved under one of its descendants",
            ));
        }
    }

    let category = Categories::update(&mut conn, user.id, id, payload).await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = pool.get().await?;

    find_owned::<Categories>(&mut conn, user.id, id).await?;
    Categories::delete(&mut conn, user.id, id).await?;
    tracing::info!(user_id = %user.id, category_id = %id, "Deleted category");
    Ok(StatusCode::NO_CONTENT)
}

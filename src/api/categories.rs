use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use sea_orm::Set;
use serde::Deserialize;
use std::sync::Arc;

use super::error::ApiError;
use super::types::{CategoryRequest, CategoryResponse, PutCategoryRequest};
use super::validation::{self, NAME_MAX_LEN};
use crate::entities::categories;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct GetQuery {
    pub id: i32,
}

/// GET /api/Categories/GetAll
pub async fn list(
    State(state): State<Arc<SharedState>>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let uow = state.store.begin().await?;
    let categories = uow.categories().list().await?;
    uow.commit().await?;

    Ok(Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// GET /api/Categories/Get?id=
pub async fn get(
    State(state): State<Arc<SharedState>>,
    Query(query): Query<GetQuery>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let uow = state.store.begin().await?;
    let category = uow
        .categories()
        .get_by_id(query.id)
        .await?
        .ok_or_else(|| ApiError::category_not_found(query.id))?;
    uow.commit().await?;

    Ok(Json(CategoryResponse::from(category)))
}

/// POST /api/Categories/Post (admin)
pub async fn create(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = Vec::new();
    let name = validation::required_text(&mut errors, "name", payload.name, NAME_MAX_LEN);
    let image_url = validation::required_text(&mut errors, "imageURL", payload.image_url, 2048);
    validation::finish(errors)?;

    let uow = state.store.begin().await?;
    let created = uow
        .categories()
        .create(categories::ActiveModel {
            name: Set(name),
            image_url: Set(image_url),
            ..Default::default()
        })
        .await?;
    uow.commit().await?;

    let location = format!("/api/Categories/Get?id={}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CategoryResponse::from(created)),
    ))
}

/// PUT /api/Categories/{id} (admin)
pub async fn update(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<i32>,
    Json(payload): Json<PutCategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    if id != payload.category_id {
        return Err(ApiError::bad_request("Mismatched category ID."));
    }

    let mut errors = Vec::new();
    let name = validation::required_text(&mut errors, "name", payload.name, NAME_MAX_LEN);
    let image_url = validation::required_text(&mut errors, "imageURL", payload.image_url, 2048);
    validation::finish(errors)?;

    let uow = state.store.begin().await?;
    let updated = uow
        .categories()
        .update(categories::ActiveModel {
            id: Set(id),
            name: Set(name),
            image_url: Set(image_url),
        })
        .await?;
    uow.commit().await?;

    Ok(Json(CategoryResponse::from(updated)))
}

/// DELETE /api/Categories/{id} (admin)
///
/// A category that still has products attached is protected by the
/// RESTRICT foreign key: the delete fails at commit and no product is
/// orphaned.
pub async fn remove(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let uow = state.store.begin().await?;

    let category = uow
        .categories()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::category_not_found(id))?;

    uow.categories().delete(category.clone()).await?;
    uow.commit().await?;

    Ok(Json(CategoryResponse::from(category)))
}

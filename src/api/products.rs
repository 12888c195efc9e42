use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use std::sync::Arc;

use super::error::ApiError;
use super::types::{ProductPatchRequest, ProductRequest, ProductResponse, PutProductRequest};
use super::validation::{
    self, DESCRIPTION_MAX_LEN, NAME_MAX_LEN, STOCK_PATCH_MAX, STOCK_PATCH_MIN, STOCK_PUT_MAX,
    STOCK_PUT_MIN,
};
use crate::entities::products;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
    #[serde(rename = "categoryId")]
    pub category_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct GetQuery {
    pub id: i32,
}

/// GET /api/Products/GetAll?name=&categoryId=
///
/// An empty result is a 404 with a message, never an empty 200 list.
pub async fn list(
    State(state): State<Arc<SharedState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let uow = state.store.begin().await?;
    let products = uow
        .products()
        .search(query.name.as_deref(), query.category_id)
        .await?;
    uow.commit().await?;

    if products.is_empty() {
        return Err(ApiError::NotFound(
            "There are no products registered in the database matching the criteria.".to_string(),
        ));
    }

    Ok(Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

/// GET /api/Products/Get?id=
pub async fn get(
    State(state): State<Arc<SharedState>>,
    Query(query): Query<GetQuery>,
) -> Result<Json<ProductResponse>, ApiError> {
    let uow = state.store.begin().await?;
    let product = uow
        .products()
        .get_by_id(query.id)
        .await?
        .ok_or_else(|| ApiError::product_not_found(query.id))?;
    uow.commit().await?;

    Ok(Json(ProductResponse::from(product)))
}

/// POST /api/Products/Post
///
/// Stock starts at zero; it is only set through the update endpoints.
pub async fn create(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<ProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = Vec::new();
    let name = validation::required_text(&mut errors, "name", payload.name, NAME_MAX_LEN);
    let description = validation::required_text(
        &mut errors,
        "description",
        payload.description,
        DESCRIPTION_MAX_LEN,
    );
    let price = validation::required_price(&mut errors, "price", payload.price);
    let image_url = validation::required_text(&mut errors, "imageURL", payload.image_url, 2048);
    let category_id = validation::required_id(&mut errors, "categoryId", payload.category_id);
    validation::finish(errors)?;

    let uow = state.store.begin().await?;
    let created = uow
        .products()
        .create(products::ActiveModel {
            name: Set(name),
            description: Set(description),
            price: Set(price),
            stock: Set(0),
            image_url: Set(image_url),
            register_date: Set(Utc::now().to_rfc3339()),
            category_id: Set(category_id),
            ..Default::default()
        })
        .await?;
    uow.commit().await?;

    let location = format!("/api/Products/Get?id={}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ProductResponse::from(created)),
    ))
}

/// PUT /api/Products/{id} (admin)
///
/// Full-row replacement: every column is written from the payload,
/// including a fresh register date.
pub async fn update(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<i32>,
    Json(payload): Json<PutProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    if id != payload.product_id {
        return Err(ApiError::bad_request(
            "The product you're looking for to update must have the same ID you're requesting",
        ));
    }

    let mut errors = Vec::new();
    let name = validation::required_text(&mut errors, "name", payload.name, NAME_MAX_LEN);
    let description = validation::required_text(
        &mut errors,
        "description",
        payload.description,
        DESCRIPTION_MAX_LEN,
    );
    let price = validation::required_price(&mut errors, "price", payload.price);
    let stock = validation::required_int_range(
        &mut errors,
        "stock",
        payload.stock,
        STOCK_PUT_MIN,
        STOCK_PUT_MAX,
    );
    let image_url = validation::required_text(&mut errors, "imageURL", payload.image_url, 2048);
    let category_id = validation::required_id(&mut errors, "categoryId", payload.category_id);
    validation::finish(errors)?;

    let uow = state.store.begin().await?;
    let updated = uow
        .products()
        .update(products::ActiveModel {
            id: Set(id),
            name: Set(name),
            description: Set(description),
            price: Set(price),
            stock: Set(stock),
            image_url: Set(image_url),
            register_date: Set(Utc::now().to_rfc3339()),
            category_id: Set(category_id),
        })
        .await?;
    uow.commit().await?;

    Ok(Json(ProductResponse::from(updated)))
}

/// PATCH /api/Products/{id}/UpdatePriceAndStock (admin)
///
/// Loads the row and overwrites only price and stock, so the other
/// columns survive untouched.
pub async fn patch_price_and_stock(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductPatchRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let mut errors = Vec::new();
    let price = validation::required_price(&mut errors, "price", payload.price);
    let stock = validation::required_int_range(
        &mut errors,
        "stock",
        payload.stock,
        STOCK_PATCH_MIN,
        STOCK_PATCH_MAX,
    );
    validation::finish(errors)?;

    if id < 1 {
        return Err(ApiError::bad_request("Invalid product id."));
    }

    let uow = state.store.begin().await?;

    let product = uow
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::product_not_found(id))?;

    let mut active: products::ActiveModel = product.into();
    active.price = Set(price);
    active.stock = Set(stock);
    let updated = uow.products().update(active).await?;

    uow.commit().await?;

    Ok(Json(ProductResponse::from(updated)))
}

/// DELETE /api/Products/{id} (admin)
pub async fn remove(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>, ApiError> {
    let uow = state.store.begin().await?;

    let product = uow
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::product_not_found(id))?;

    uow.products().delete(product.clone()).await?;
    uow.commit().await?;

    Ok(Json(ProductResponse::from(product)))
}

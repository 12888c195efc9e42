use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::Set;
use std::sync::Arc;

use super::error::ApiError;
use super::types::{OrderItemResponse, OrderRequest, OrderResponse};
use super::validation;
use crate::entities::{order_items, orders};
use crate::state::SharedState;

/// GET /api/Orders/GetAllOrders (admin)
pub async fn list(
    State(state): State<Arc<SharedState>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let uow = state.store.begin().await?;
    let orders = uow.orders().all_with_items().await?;
    uow.commit().await?;

    if orders.is_empty() {
        return Err(ApiError::NotFound(
            "There's no orders registered in our database".to_string(),
        ));
    }

    Ok(Json(
        orders
            .into_iter()
            .map(|(order, items)| OrderResponse::from_order(order, items))
            .collect(),
    ))
}

/// POST /api/Orders/CreateOrder
///
/// All-or-nothing: every product id must resolve before anything is
/// persisted, and the order row plus all item rows land in one commit.
/// Unit prices are snapshots of the product price at lookup time; the
/// total is fixed here and never recomputed. Stock is neither checked
/// nor decremented.
pub async fn create(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<OrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.items.is_empty() {
        return Err(ApiError::bad_request("An order needs at least one item."));
    }

    let mut errors = Vec::new();
    for (index, item) in payload.items.iter().enumerate() {
        if item.quantity < 1 {
            errors.push(ApiError::field(
                format!("items[{}].quantity", index),
                "quantity must be greater than 0",
            ));
        }
    }
    validation::finish(errors)?;

    let uow = state.store.begin().await?;

    let mut total = Decimal::ZERO;
    let mut lines = Vec::with_capacity(payload.items.len());

    for item in &payload.items {
        let product = uow
            .products()
            .get_by_id(item.product_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Product ID {} not found.", item.product_id))
            })?;

        total += product.price * Decimal::from(item.quantity);
        lines.push((product, item.quantity));
    }

    let order = uow
        .orders()
        .create(orders::ActiveModel {
            created_at: Set(Utc::now().to_rfc3339()),
            total: Set(total),
            ..Default::default()
        })
        .await?;

    let item_rows = lines
        .iter()
        .map(|(product, quantity)| order_items::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(product.id),
            quantity: Set(*quantity),
            unit_price: Set(product.price),
            ..Default::default()
        })
        .collect();
    uow.orders().insert_items(item_rows).await?;

    uow.commit().await?;

    let response = OrderResponse {
        order_id: order.id,
        created_at: order.created_at,
        items: lines
            .into_iter()
            .map(|(product, quantity)| OrderItemResponse {
                price: product.price,
                product_name: product.name,
                quantity,
            })
            .collect(),
        total: order.total,
    };

    let location = format!("/api/Orders/{}", response.order_id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(response),
    ))
}

/// GET /api/Orders/{id} (admin)
pub async fn get(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<i32>,
) -> Result<Json<OrderResponse>, ApiError> {
    let uow = state.store.begin().await?;
    let order = uow
        .orders()
        .get_with_items(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found.".to_string()))?;
    uow.commit().await?;

    let (order, items) = order;
    Ok(Json(OrderResponse::from_order(order, items)))
}

/// DELETE /api/Orders/{id} (admin)
///
/// Items go with the order via the cascade on the order foreign key.
pub async fn remove(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let uow = state.store.begin().await?;

    let order = uow
        .orders()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order with ID {} not found.", id)))?;

    uow.orders().delete(order).await?;
    uow.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

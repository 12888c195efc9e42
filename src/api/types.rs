//! Wire-level request and response shapes, distinct from the persisted
//! entities, with explicit mapping between the two.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{categories, order_items, orders, products};

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    /// RFC3339 expiry of the access token.
    pub expiration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "imageURL")]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PutCategoryRequest {
    #[serde(default, rename = "categoryId")]
    pub category_id: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "imageURL")]
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    #[serde(rename = "categoryId")]
    pub category_id: i32,
    pub name: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

impl From<categories::Model> for CategoryResponse {
    fn from(model: categories::Model) -> Self {
        Self {
            category_id: model.id,
            name: model.name,
            image_url: model.image_url,
        }
    }
}

// ============================================================================
// Products
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default, rename = "imageURL")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutProductRequest {
    #[serde(default)]
    pub product_id: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default, rename = "imageURL")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<i32>,
}

/// Partial update of price and stock only.
#[derive(Debug, Deserialize)]
pub struct ProductPatchRequest {
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub product_id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    /// Serialized as a string, matching the established contract.
    pub category_id: String,
    pub stock: i32,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub register_date: String,
}

impl From<products::Model> for ProductResponse {
    fn from(model: products::Model) -> Self {
        Self {
            product_id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            category_id: model.category_id.to_string(),
            stock: model.stock,
            image_url: model.image_url,
            register_date: model.register_date,
        }
    }
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[serde(default)]
    pub product_id: i32,
    #[serde(default)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub product_name: String,
    /// Unit price captured when the order was placed.
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: i32,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
    pub total: Decimal,
}

impl OrderResponse {
    /// Projects an order and its joined items into the response shape.
    /// The back-references (item→order, product→category) are never
    /// serialized.
    #[must_use]
    pub fn from_order(
        order: orders::Model,
        items: Vec<(order_items::Model, products::Model)>,
    ) -> Self {
        Self {
            order_id: order.id,
            created_at: order.created_at,
            items: items
                .into_iter()
                .map(|(item, product)| OrderItemResponse {
                    product_name: product.name,
                    price: item.unit_price,
                    quantity: item.quantity,
                })
                .collect(),
            total: order.total,
        }
    }
}

//! Integration tests for product listing, creation, partial update and
//! the role gate on the admin endpoints.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::sync::Arc;
use storefront::Config;
use storefront::services::Claims;
use storefront::state::SharedState;
use tower::ServiceExt;

const ADMIN_PASSWORD: &str = "product-test-password";
const TEST_SECRET: &str = "integration-test-secret";

async fn spawn_app() -> Router {
    let db_path = std::env::temp_dir().join(format!(
        "storefront-products-test-{}.db",
        uuid::Uuid::new_v4()
    ));

    let mut config = Config::default();
    config.database.url = format!("sqlite:{}", db_path.display());
    config.jwt.secret = TEST_SECRET.to_string();
    config.admin.email = "admin@storefront.test".to_string();
    config.admin.password = ADMIN_PASSWORD.to_string();

    let state = SharedState::new(config)
        .await
        .expect("failed to create app state");

    storefront::api::router(Arc::new(state))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json, location)
}

async fn admin_token(app: &Router) -> String {
    let (status, body, _) = send(
        app,
        "POST",
        "/api/Auth/login",
        None,
        Some(serde_json::json!({ "username": "admin", "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

/// A structurally valid access token carrying no roles at all.
fn non_admin_token() -> String {
    let defaults = Config::default();
    let claims = Claims {
        sub: "shopper".to_string(),
        email: "shopper@storefront.test".to_string(),
        jti: uuid::Uuid::new_v4().to_string(),
        roles: vec![],
        iss: defaults.jwt.valid_issuer,
        aud: defaults.jwt.valid_audience,
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

async fn seed_category(app: &Router, token: &str, name: &str) -> i64 {
    let (status, body, _) = send(
        app,
        "POST",
        "/api/Categories/Post",
        Some(token),
        Some(serde_json::json!({ "name": name, "imageURL": "http://img/cat.png" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["categoryId"].as_i64().unwrap()
}

async fn seed_product(app: &Router, name: &str, price: f64, category_id: i64) -> i64 {
    let (status, body, _) = send(
        app,
        "POST",
        "/api/Products/Post",
        None,
        Some(serde_json::json!({
            "name": name,
            "description": format!("{name} description"),
            "price": price,
            "imageURL": "http://img/product.png",
            "categoryId": category_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["productId"].as_i64().unwrap()
}

#[tokio::test]
async fn get_all_without_products_is_not_found() {
    let app = spawn_app().await;

    let (status, body, _) = send(&app, "GET", "/api/Products/GetAll", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("no products registered")
    );
}

#[tokio::test]
async fn get_all_with_unmatched_name_is_not_found_not_an_empty_list() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let category = seed_category(&app, &token, "Books").await;
    seed_product(&app, "A novel", 12.5, category).await;

    let (status, body, _) = send(
        &app,
        "GET",
        "/api/Products/GetAll?name=zzz-no-match",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn create_returns_the_created_product() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let category = seed_category(&app, &token, "Books").await;

    let (status, body, location) = send(
        &app,
        "POST",
        "/api/Products/Post",
        None,
        Some(serde_json::json!({
            "name": "A novel",
            "description": "Hardcover",
            "price": 25.5,
            "imageURL": "http://img/novel.png",
            "categoryId": category,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let id = body["productId"].as_i64().unwrap();
    assert_eq!(location.unwrap(), format!("/api/Products/Get?id={id}"));
    assert_eq!(body["name"], "A novel");
    assert_eq!(body["price"], serde_json::json!(25.5));
    assert_eq!(body["stock"], 0);
    assert_eq!(body["categoryId"], category.to_string());
    assert!(body["registerDate"].as_str().is_some());
}

#[tokio::test]
async fn create_with_out_of_range_price_is_rejected() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let category = seed_category(&app, &token, "Books").await;

    let (status, body, _) = send(
        &app,
        "POST",
        "/api/Products/Post",
        None,
        Some(serde_json::json!({
            "name": "A novel",
            "description": "Hardcover",
            "price": 15000,
            "imageURL": "http://img/novel.png",
            "categoryId": category,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["price"].is_array());
}

#[tokio::test]
async fn list_filters_by_name_and_category() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let books = seed_category(&app, &token, "Books").await;
    let games = seed_category(&app, &token, "Games").await;
    seed_product(&app, "A long novel", 12.5, books).await;
    seed_product(&app, "A board game", 30.0, games).await;

    let (status, body, _) = send(&app, "GET", "/api/Products/GetAll?name=novel", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "A long novel");

    let (status, body, _) = send(
        &app,
        "GET",
        &format!("/api/Products/GetAll?categoryId={games}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "A board game");
}

#[tokio::test]
async fn patch_updates_price_and_stock_only() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let category = seed_category(&app, &token, "Books").await;
    let id = seed_product(&app, "A novel", 25.5, category).await;

    let (status, body, _) = send(
        &app,
        "PATCH",
        &format!("/api/Products/{id}/UpdatePriceAndStock"),
        Some(token.as_str()),
        Some(serde_json::json!({ "price": 19.75, "stock": 40 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], serde_json::json!(19.75));
    assert_eq!(body["stock"], 40);
    // Everything else survives the patch.
    assert_eq!(body["name"], "A novel");
    assert_eq!(body["description"], "A novel description");
}

#[tokio::test]
async fn patch_above_the_range_is_rejected_and_mutates_nothing() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let category = seed_category(&app, &token, "Books").await;
    let id = seed_product(&app, "A novel", 25.5, category).await;

    let (status, body, _) = send(
        &app,
        "PATCH",
        &format!("/api/Products/{id}/UpdatePriceAndStock"),
        Some(token.as_str()),
        Some(serde_json::json!({ "price": 15000, "stock": 40 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["price"].is_array());

    let (_, fetched, _) = send(&app, "GET", &format!("/api/Products/Get?id={id}"), None, None).await;
    assert_eq!(fetched["price"], serde_json::json!(25.5));
    assert_eq!(fetched["stock"], 0);
}

#[tokio::test]
async fn patch_of_a_missing_product_is_not_found() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let (status, body, _) = send(
        &app,
        "PATCH",
        "/api/Products/4242/UpdatePriceAndStock",
        Some(token.as_str()),
        Some(serde_json::json!({ "price": 10, "stock": 10 })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("4242"));
}

#[tokio::test]
async fn patch_requires_a_token() {
    let app = spawn_app().await;

    let (status, _, _) = send(
        &app,
        "PATCH",
        "/api/Products/1/UpdatePriceAndStock",
        None,
        Some(serde_json::json!({ "price": 10, "stock": 10 })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn patch_with_a_non_admin_token_is_forbidden() {
    let app = spawn_app().await;
    let token = non_admin_token();

    let (status, _, _) = send(
        &app,
        "PATCH",
        "/api/Products/1/UpdatePriceAndStock",
        Some(token.as_str()),
        Some(serde_json::json!({ "price": 10, "stock": 10 })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn put_with_mismatched_id_is_bad_request() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let category = seed_category(&app, &token, "Books").await;
    let id = seed_product(&app, "A novel", 25.5, category).await;

    let (status, _, _) = send(
        &app,
        "PUT",
        &format!("/api/Products/{id}"),
        Some(token.as_str()),
        Some(serde_json::json!({
            "productId": id + 1,
            "name": "A novel",
            "description": "Hardcover",
            "price": 25.5,
            "stock": 5,
            "imageURL": "http://img/novel.png",
            "categoryId": category,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_replaces_the_product() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let category = seed_category(&app, &token, "Books").await;
    let id = seed_product(&app, "A novel", 25.5, category).await;

    let (status, body, _) = send(
        &app,
        "PUT",
        &format!("/api/Products/{id}"),
        Some(token.as_str()),
        Some(serde_json::json!({
            "productId": id,
            "name": "A revised novel",
            "description": "Paperback",
            "price": 18.0,
            "stock": 12,
            "imageURL": "http://img/novel2.png",
            "categoryId": category,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "A revised novel");
    assert_eq!(body["stock"], 12);
    assert_eq!(body["price"], serde_json::json!(18.0));
}

#[tokio::test]
async fn delete_returns_the_deleted_product() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let category = seed_category(&app, &token, "Books").await;
    let id = seed_product(&app, "A novel", 25.5, category).await;

    let (status, body, _) = send(
        &app,
        "DELETE",
        &format!("/api/Products/{id}"),
        Some(token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "A novel");

    let (status, _, _) = send(&app, "GET", &format!("/api/Products/Get?id={id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

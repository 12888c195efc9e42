use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
mod categories;
mod error;
mod orders;
mod products;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use crate::state::SharedState;

pub fn router(state: Arc<SharedState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let admin_routes = create_admin_router(state.clone());
    let protected_routes = create_protected_router(state.clone());

    let public_routes = Router::new()
        .route("/Auth/login", post(auth::login))
        .route("/Auth/refresh-token", post(auth::refresh_token))
        .route("/Categories/GetAll", get(categories::list))
        .route("/Categories/Get", get(categories::get))
        .route("/Products/GetAll", get(products::list))
        .route("/Products/Get", get(products::get))
        .route("/Products/Post", post(products::create))
        .route("/Orders/CreateOrder", post(orders::create));

    let api_router = public_routes
        .merge(protected_routes)
        .merge(admin_routes)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// Routes any authenticated user may call.
fn create_protected_router(state: Arc<SharedState>) -> Router<Arc<SharedState>> {
    Router::new()
        .route("/Auth/revoke/{username}", post(auth::revoke))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

/// Routes gated on the ADMIN role.
fn create_admin_router(state: Arc<SharedState>) -> Router<Arc<SharedState>> {
    Router::new()
        .route("/Categories/Post", post(categories::create))
        .route("/Categories/{id}", put(categories::update))
        .route("/Categories/{id}", delete(categories::remove))
        .route("/Products/{id}", put(products::update))
        .route(
            "/Products/{id}/UpdatePriceAndStock",
            patch(products::patch_price_and_stock),
        )
        .route("/Products/{id}", delete(products::remove))
        .route("/Orders/GetAllOrders", get(orders::list))
        .route("/Orders/{id}", get(orders::get))
        .route("/Orders/{id}", delete(orders::remove))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

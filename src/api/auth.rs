use axum::{
    Json,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::Set;
use std::sync::Arc;
use uuid::Uuid;

use super::error::ApiError;
use super::types::{LoginRequest, LoginResponse, TokenRequest, TokenResponse};
use super::validation;
use crate::db::repositories::verify_password;
use crate::db::seed::ADMIN_ROLE;
use crate::entities::users;
use crate::services::TokenService;
use crate::state::SharedState;

/// Rejection message shared by every refresh failure path, so a caller
/// cannot tell which check failed.
const INVALID_TOKEN_PAIR: &str = "Invalid access token/refresh token";

/// Identity recovered from a validated access token, attached to the
/// request for downstream handlers and the admin gate.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

// ============================================================================
// Middleware
// ============================================================================

/// Requires a valid bearer access token. Signature, issuer, audience and
/// lifetime are all enforced with zero clock-skew leeway.
pub async fn auth_middleware(
    State(state): State<Arc<SharedState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).ok_or(ApiError::Unauthorized)?;

    let claims = state
        .tokens
        .decode_token(&token)
        .map_err(|_| ApiError::Unauthorized)?;

    request.extensions_mut().insert(AuthUser {
        username: claims.sub,
        email: claims.email,
        roles: claims.roles,
    });

    Ok(next.run(request).await)
}

/// Gate for admin-only routes; runs after `auth_middleware`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = request
        .extensions()
        .get::<AuthUser>()
        .is_some_and(|user| user.roles.iter().any(|role| role == ADMIN_ROLE));

    if !is_admin {
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/Auth/login
/// Verifies credentials and returns an access token, a fresh refresh
/// token, and the access token's expiry. Persists the refresh token and
/// its own expiry on the user row.
pub async fn login(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let mut errors = Vec::new();
    let username = validation::required_text(&mut errors, "username", payload.username, 256);
    let password = validation::required_text(&mut errors, "password", payload.password, 256);
    validation::finish(errors)?;

    let uow = state.store.begin().await?;

    // Unknown user and bad password take the same exit: a generic 401.
    let Some(user) = uow.users().get_by_username(&username).await? else {
        return Err(ApiError::Unauthorized);
    };

    if !verify_password(user.password_hash.clone(), password).await? {
        return Err(ApiError::Unauthorized);
    }

    let roles = uow.users().roles_for(&user).await?;

    let jti = Uuid::new_v4().to_string();
    let issued = state
        .tokens
        .generate_access_token(&user.username, &user.email, &jti, roles)?;

    let refresh_token = TokenService::generate_refresh_token();
    let refresh_expires_at =
        Utc::now() + Duration::minutes(state.config.jwt.refresh_token_validity_minutes);

    let mut active: users::ActiveModel = user.into();
    active.refresh_token = Set(Some(refresh_token.clone()));
    active.refresh_token_expires_at = Set(Some(refresh_expires_at.to_rfc3339()));
    active.updated_at = Set(Utc::now().to_rfc3339());
    uow.users().update(active).await?;

    uow.commit().await?;

    Ok(Json(LoginResponse {
        token: issued.token,
        refresh_token,
        expiration: issued.expires_at.to_rfc3339(),
    }))
}

/// POST /api/Auth/refresh-token
/// Exchanges an expired-but-valid access token plus the current refresh
/// token for a new pair. The refresh token is rotated: after a
/// successful exchange the submitted one no longer validates.
pub async fn refresh_token(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Some(access_token) = payload.access_token else {
        return Err(ApiError::bad_request("Invalid client request"));
    };
    let Some(refresh_token) = payload.refresh_token else {
        return Err(ApiError::bad_request("Invalid client request"));
    };

    // The access token may be expired; signature, issuer and audience
    // still have to hold for the claimed identity to count.
    let claims = state
        .tokens
        .decode_expired_token(&access_token)
        .map_err(|_| ApiError::bad_request(INVALID_TOKEN_PAIR))?;

    let uow = state.store.begin().await?;

    let Some(user) = uow.users().get_by_username(&claims.sub).await? else {
        return Err(ApiError::bad_request(INVALID_TOKEN_PAIR));
    };

    let token_matches = user.refresh_token.as_deref() == Some(refresh_token.as_str());
    let still_valid = user
        .refresh_token_expires_at
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .is_some_and(|expiry| expiry > Utc::now());

    if !token_matches || !still_valid {
        return Err(ApiError::bad_request(INVALID_TOKEN_PAIR));
    }

    let issued =
        state
            .tokens
            .generate_access_token(&claims.sub, &claims.email, &claims.jti, claims.roles)?;
    let new_refresh_token = TokenService::generate_refresh_token();

    let mut active: users::ActiveModel = user.into();
    active.refresh_token = Set(Some(new_refresh_token.clone()));
    active.updated_at = Set(Utc::now().to_rfc3339());
    uow.users().update(active).await?;

    uow.commit().await?;

    Ok(Json(TokenResponse {
        access_token: issued.token,
        refresh_token: new_refresh_token,
    }))
}

/// POST /api/Auth/revoke/{username}
/// Clears the named user's refresh token. Requires a valid access token
/// but is not scoped to the caller's own identity. Idempotent.
pub async fn revoke(
    State(state): State<Arc<SharedState>>,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    let uow = state.store.begin().await?;

    let Some(user) = uow.users().get_by_username(&username).await? else {
        return Err(ApiError::bad_request("Invalid user name"));
    };

    let mut active: users::ActiveModel = user.into();
    active.refresh_token = Set(None);
    active.updated_at = Set(Utc::now().to_rfc3339());
    uow.users().update(active).await?;

    uow.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

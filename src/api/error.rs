use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A single failed field check, reported back to the caller.
#[derive(Debug, Clone)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    /// Field-level validation failures, enumerated per field.
    Validation(Vec<FieldError>),

    /// Malformed request that is not tied to one field.
    BadRequest(String),

    Unauthorized,

    Forbidden,

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                write!(f, "Validation error: {}", fields.join(", "))
            }
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Forbidden => write!(f, "Forbidden"),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": msg }))).into_response()
            }
            ApiError::Validation(errors) => {
                let mut fields = serde_json::Map::new();
                for error in errors {
                    if let Some(messages) = fields
                        .entry(error.field)
                        .or_insert_with(|| json!([]))
                        .as_array_mut()
                    {
                        messages.push(json!(error.message));
                    }
                }
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": fields }))).into_response()
            }
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": msg }))).into_response()
            }
            // No detail on auth failures.
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::Forbidden => StatusCode::FORBIDDEN.into_response(),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                generic_server_error()
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                generic_server_error()
            }
        }
    }
}

fn generic_server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "An unexpected error occurred." })),
    )
        .into_response()
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(format!("{err:#}"))
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

impl From<crate::services::TokenError> for ApiError {
    fn from(err: crate::services::TokenError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl ApiError {
    pub fn product_not_found(id: i32) -> Self {
        ApiError::NotFound(format!("Product with the id = {} was not found.", id))
    }

    pub fn category_not_found(id: i32) -> Self {
        ApiError::NotFound(format!("Category with ID = {} was not found.", id))
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> FieldError {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

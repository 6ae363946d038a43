use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::auth::domain::IdentityError;
use service::auth::errors::AuthError;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

pub const INVALID_REQUEST: &str = "Invalid client request";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const DUPLICATE_EMAIL: &str = "User with this email already exists";

/// JSON error body shared by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[schema(value_type = Vec<Object>)]
    pub errors: Vec<IdentityError>,
}

#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &str, message: Option<String>) -> Self {
        Self {
            status,
            body: ErrorBody { success: false, error: error.to_string(), message, errors: Vec::new() },
        }
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(message.to_string()))
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidRequest => Self::new(StatusCode::BAD_REQUEST, "Bad Request", Some(INVALID_REQUEST.into())),
            AuthError::Validation(errors) => {
                let mut err = Self::new(StatusCode::BAD_REQUEST, "Validation Error", None);
                err.body.errors = errors;
                err
            }
            AuthError::Conflict => Self::new(StatusCode::CONFLICT, "Conflict", Some(DUPLICATE_EMAIL.into())),
            AuthError::Unauthorized => Self::unauthorized(INVALID_CREDENTIALS),
            AuthError::InvalidToken(_) => Self::unauthorized("Invalid or expired token"),
            internal => {
                error!(code = internal.code(), error = %internal, "request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
}

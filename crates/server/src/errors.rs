use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// JSON error body: `{ "code": "ClientNotFound", "description": "..." }`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub description: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, description: impl Into<String>) -> Self {
        Self { status, body: ErrorBody { code: code.into(), description: description.into() } }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        let status = match &e {
            ServiceError::AlreadyExists { .. } => StatusCode::CONFLICT,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            ServiceError::NotAuthorized { .. } => StatusCode::FORBIDDEN,
            ServiceError::Db(_) | ServiceError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.code(), e.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let (status, code) = match &e {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "InvalidCredentials"),
            AuthError::Inactive => (StatusCode::UNAUTHORIZED, "AccountDisabled"),
            AuthError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "InvalidToken"),
            AuthError::TokenError(_) | AuthError::Repository(_) => (StatusCode::INTERNAL_SERVER_ERROR, "AuthError"),
        };
        Self::new(status, code, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(code = %self.body.code, error = %self.body.description, "request failed");
        } else {
            warn!(status = %self.status, code = %self.body.code, "request rejected");
        }
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ErrorBody;
use crate::services::{ArticleError, ArticleErrorKind};

const STORAGE_UNAVAILABLE_MESSAGE: &str =
    "Database service is temporarily unavailable. Please try again later.";

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    StorageUnavailable(String),

    ValidationError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::StorageUnavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::NotFound(msg) => ErrorBody::new("Resource not found", msg),
            ApiError::StorageUnavailable(_) => {
                ErrorBody::new("Database service unavailable", STORAGE_UNAVAILABLE_MESSAGE)
            }
            ApiError::ValidationError(msg) => ErrorBody::new("Invalid request", msg),
            ApiError::InternalError(_) => {
                ErrorBody::new("Internal server error", "An unexpected error occurred")
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ArticleError> for ApiError {
    fn from(err: ArticleError) -> Self {
        let detail = match err.cause_detail() {
            Some(cause) => format!("{} ({cause}) at {}", err.message, err.occurred_at),
            None => format!("{} at {}", err.message, err.occurred_at),
        };

        match err.kind {
            ArticleErrorKind::Validation => Self::ValidationError(err.message),
            ArticleErrorKind::StorageUnavailable => Self::StorageUnavailable(detail),
            ArticleErrorKind::Internal => Self::InternalError(detail),
        }
    }
}

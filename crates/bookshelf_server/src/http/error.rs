//! Service error to HTTP response mapping.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bookshelf_core::{LookupError, ServiceError};
use log::error;
use serde_json::json;

/// JSON error body: `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "validation_failed", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {"code": self.code, "message": self.message}
        }));
        (self.status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::validation(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::validation(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::validation(value.body_text())
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        let message = value.to_string();
        match value {
            ServiceError::Validation(_) => Self::validation(message),
            ServiceError::DuplicateIsbn(_) => {
                Self::new(StatusCode::CONFLICT, "duplicate_isbn", message)
            }
            ServiceError::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "not_found", message)
            }
            ServiceError::Lookup(err) => lookup_error(err),
            ServiceError::Storage(err) => {
                error!("event=http_error module=http status=error error_code=storage_failed error={err}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_failed",
                    "the library could not be saved",
                )
            }
        }
    }
}

fn lookup_error(err: LookupError) -> ApiError {
    match err {
        LookupError::InvalidIsbn(_) => {
            ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_isbn", err.to_string())
        }
        LookupError::NotFound(_) => ApiError::new(
            StatusCode::NOT_FOUND,
            "lookup_not_found",
            "book not found with the provided ISBN",
        ),
        LookupError::Disabled => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "lookup_disabled",
            err.to_string(),
        ),
        LookupError::Status(_) | LookupError::Transport(_) | LookupError::Malformed(_) => {
            error!("event=http_error module=http status=error error_code=lookup_failed error={err}");
            ApiError::new(
                StatusCode::BAD_GATEWAY,
                "lookup_failed",
                "book metadata could not be fetched",
            )
        }
    }
}

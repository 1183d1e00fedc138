//! HTTP surface of the record store.
//!
//! Handlers only translate: path and body go through the validation gate,
//! the store does the work, and [`WebError`] maps failures to status codes.

pub mod app;
pub mod handlers;
pub mod state;

pub use app::build_router;
pub use state::AppState;

use crate::core::{StoreError, ValidationError, ValidationIssue};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<ValidationIssue>>,
}

#[derive(Debug)]
pub enum WebError {
    Store(StoreError),
    Validation(ValidationError),
}

impl From<StoreError> for WebError {
    fn from(err: StoreError) -> Self {
        WebError::Store(err)
    }
}

impl From<ValidationError> for WebError {
    fn from(err: ValidationError) -> Self {
        WebError::Validation(err)
    }
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Validation(_) => StatusCode::BAD_REQUEST,
            WebError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            WebError::Store(StoreError::DuplicateId(_)) => StatusCode::CONFLICT,
            WebError::Store(StoreError::ReadFailure { .. } | StoreError::WriteFailure { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            WebError::Validation(err) => ErrorResponse {
                error: "validation failed".to_string(),
                code: "validation_error".to_string(),
                issues: Some(err.into_issues()),
            },
            WebError::Store(err) => {
                let code = match &err {
                    StoreError::NotFound(_) => "not_found",
                    StoreError::DuplicateId(_) => "conflict",
                    StoreError::ReadFailure { .. } => "read_failure",
                    StoreError::WriteFailure { .. } => "write_failure",
                };
                let message = if err.is_io() {
                    error!(error = %err, "record store I/O failure");
                    "record storage is unavailable".to_string()
                } else {
                    err.to_string()
                };
                ErrorResponse {
                    error: message,
                    code: code.to_string(),
                    issues: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::WebError;
    use crate::core::{StoreError, ValidationError};
    use axum::http::StatusCode;
    use std::path::Path;

    #[test]
    fn store_errors_map_to_statuses() {
        assert_eq!(
            WebError::from(StoreError::NotFound(1)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WebError::from(StoreError::DuplicateId(1)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            WebError::from(StoreError::write_failure(Path::new("data.json"), "disk full")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_error_maps_to_bad_request() {
        let err = WebError::from(ValidationError::single("name", "is required"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}

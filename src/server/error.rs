//! HTTP mapping for domain errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::errors::RecordError;

/// Wrapper turning a domain error into the HTTP response its class calls
/// for: rejections are 400 with the message, the completed lock is 403,
/// missing records are 404, storage failures are an opaque 500.
pub struct ApiError(pub RecordError);

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            RecordError::Schema(_) | RecordError::Association(_) => {
                (StatusCode::BAD_REQUEST, "validation_failed")
            }
            RecordError::CompletedLocked { .. } => (StatusCode::FORBIDDEN, "completed_locked"),
            RecordError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            RecordError::Database(err) => {
                error!("database error: {err}");
                let body = json!({ "error": "internal", "message": "Internal server error." });
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
        };
        let body = json!({ "error": code, "message": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

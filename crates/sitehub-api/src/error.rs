//! Maps domain `AppError` values to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use sitehub_core::error::{AppError, ErrorKind};

/// Response-side wrapper around [`AppError`].
///
/// Handlers return `Result<_, ApiError>`; the `?` operator converts
/// domain errors through the `From` impl below.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, message) = match err.kind {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, err.message),
            ErrorKind::Unauthorized => (StatusCode::UNAUTHORIZED, err.message),
            ErrorKind::Forbidden => (StatusCode::FORBIDDEN, err.message),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, err.message),
            ErrorKind::Conflict => (StatusCode::CONFLICT, err.message),
            ErrorKind::UnsafeArchiveEntry => {
                // Folded into a generic upload failure; the entry name is
                // logged server-side only.
                tracing::warn!(error = %err.message, "Rejected unsafe archive");
                (
                    StatusCode::BAD_REQUEST,
                    "Uploaded archive contains invalid entries".to_string(),
                )
            }
            ErrorKind::Extraction => {
                tracing::error!(error = %err.message, "Archive extraction failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "File upload failed".to_string(),
                )
            }
            ErrorKind::Database
            | ErrorKind::Storage
            | ErrorKind::Serialization
            | ErrorKind::Configuration
            | ErrorKind::Internal => {
                tracing::error!(kind = %err.kind, error = %err.message, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({
            "success": false,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::validation("x"), StatusCode::BAD_REQUEST),
            (AppError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (AppError::forbidden("x"), StatusCode::FORBIDDEN),
            (AppError::not_found("x"), StatusCode::NOT_FOUND),
            (AppError::conflict("x"), StatusCode::CONFLICT),
            (AppError::unsafe_archive_entry("x"), StatusCode::BAD_REQUEST),
            (
                AppError::extraction("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::database("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let response = ApiError(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}

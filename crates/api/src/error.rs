//! Error to HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use brightpath_shared::AppError;
use serde_json::json;
use tracing::{debug, error};

/// Handler error rendered as `{"error": <code>, "message": <text>}`.
#[derive(Debug)]
pub struct ApiError(AppError);

/// Result type for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Shorthand for a 400 response.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self(AppError::Validation(msg.into()))
    }

    /// The wrapped application error.
    #[must_use]
    pub const fn inner(&self) -> &AppError {
        &self.0
    }
}

impl<E: Into<AppError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if self.0.is_client_error() {
            debug!(error = %self.0, "Request rejected");
            self.0.to_string()
        } else {
            error!(error = %self.0, "Request failed");
            "An internal error occurred".to_string()
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message
            })),
        )
            .into_response()
    }
}

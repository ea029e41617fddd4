//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::media::MediaError;
use crate::orchestrator::RequestError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No analysis data provided. Include symptoms or a medical image")]
    NoInput,
    #[error("Symptoms are required")]
    EmptySymptoms,
    #[error("A medical image is required")]
    MissingImage,
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::NoInput => ApiError::NoInput,
            RequestError::Media(e) => ApiError::Media(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::NoInput => (StatusCode::BAD_REQUEST, "NO_INPUT", self.to_string()),
            ApiError::EmptySymptoms => {
                (StatusCode::BAD_REQUEST, "EMPTY_SYMPTOMS", self.to_string())
            }
            ApiError::MissingImage => {
                (StatusCode::BAD_REQUEST, "MISSING_IMAGE", self.to_string())
            }
            ApiError::Media(MediaError::UnsupportedType { .. }) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_MEDIA_TYPE", self.to_string())
            }
            ApiError::Media(MediaError::TooLarge { .. }) => {
                (StatusCode::BAD_REQUEST, "FILE_TOO_LARGE", self.to_string())
            }
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

//! Error types for huemood-gen
//!
//! Only request validation, configuration problems and an aborted
//! generation task reach the client as errors. External service failures
//! never do; the orchestrator recovers them with fallback data.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::InputError;

/// Message returned when no generation client can be constructed
pub const CONFIGURATION_MESSAGE: &str =
    "Internal Server Error: text generation client initialization failed.";

/// Message returned for unexpected internal failures
pub const INTERNAL_MESSAGE: &str = "Failed to generate palettes";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Service misconfiguration, e.g. no API key (500)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generation task aborted before producing palettes (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Configuration(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                CONFIGURATION_MESSAGE.to_string(),
                Some(detail),
            ),
            ApiError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_MESSAGE.to_string(),
                Some(detail),
            ),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), detail = ?detail, "{}", message);
        }

        let body = match detail {
            Some(detail) => json!({ "message": message, "error": detail }),
            None => json!({ "message": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_bad_request_has_message_only() {
        let (status, body) = body_json(InputError::MissingPrompt.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Prompt is required" }));
    }

    #[tokio::test]
    async fn test_configuration_error_message() {
        let (status, body) =
            body_json(ApiError::Configuration("API key not configured".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], CONFIGURATION_MESSAGE);
        assert_eq!(body["error"], "API key not configured");
    }

    #[tokio::test]
    async fn test_internal_error_message() {
        let (status, body) = body_json(ApiError::Internal("boom".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], INTERNAL_MESSAGE);
        assert_eq!(body["error"], "boom");
    }
}

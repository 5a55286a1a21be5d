use crate::registry::RegistryError;
use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::error;

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Body is not valid JSON or does not have the expected shape
    InvalidPayload(String),
    PayloadTooLarge,
    /// State update named unregistered traffic lights (reject policy only)
    UnknownEntity(Vec<String>),
    Internal(String),
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownEntity { ids } => ApiError::UnknownEntity(ids),
            poisoned @ RegistryError::Poisoned { .. } => ApiError::Internal(poisoned.to_string()),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::InvalidPayload(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::InvalidPayload(msg) => {
                (StatusCode::BAD_REQUEST, format!("invalid payload: {}", msg))
            }
            ApiError::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload too large".to_string())
            }
            ApiError::UnknownEntity(ids) => (
                StatusCode::NOT_FOUND,
                format!("unknown traffic lights: {}", ids.join(", ")),
            ),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Registry fault");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

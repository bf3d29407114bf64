//! services/api/src/error.rs
//!
//! Defines the error types for the API service: `ApiError` for startup and
//! wiring failures, and `HandlerError` for failures returned to the browser.

use crate::config::ConfigError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diabetes_education_core::ports::{GenerationError, PortError};
use diabetes_education_core::ValidationError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//=========================================================================================
// Handler Errors
//=========================================================================================

/// JSON body of every error response: `{"error": {"kind": ..., "message": ...}}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
}

/// Failures a request handler reports back to the form.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Invalid form input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("Consent to the education-only disclaimer is required")]
    ConsentRequired,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            HandlerError::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation",
                e.to_string(),
            ),
            HandlerError::Body(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation",
                e.body_text(),
            ),
            HandlerError::ConsentRequired => (
                StatusCode::BAD_REQUEST,
                "consent_required",
                "Please tick the consent box to continue.".to_string(),
            ),
            HandlerError::Generation(e) => {
                error!("Summary generation failed: {}", e);
                let (status, message) = match e {
                    GenerationError::Authentication(_) => (
                        StatusCode::BAD_GATEWAY,
                        "The summary service could not authenticate. Please contact the site operator.",
                    ),
                    GenerationError::QuotaExceeded(_) => (
                        StatusCode::TOO_MANY_REQUESTS,
                        "The summary service is busy right now. Please try again in a few minutes.",
                    ),
                    GenerationError::Timeout(_) => (
                        StatusCode::GATEWAY_TIMEOUT,
                        "The summary took too long to generate. Please try again.",
                    ),
                    GenerationError::Other(_) => (
                        StatusCode::BAD_GATEWAY,
                        "Something went wrong while generating your summary. Please try again.",
                    ),
                };
                (status, e.kind(), message.to_string())
            }
            HandlerError::Port(e) => {
                error!("Port failure while handling request: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                kind: kind.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

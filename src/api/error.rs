use crate::services::pipeline::PipelineError;
use crate::utils::validation::ValidationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::any::Any;
use thiserror::Error;
use utoipa::ToSchema;

pub const MISSING_URL: &str = "Please Enter a URL";
pub const INVALID_URL: &str = "Please provide a valid url";
pub const CANNOT_ELABORATE: &str = "We can not elaborate your image";
pub const CANNOT_PROCESS: &str = "We can not process your request";

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Please Enter a URL")]
    MissingUrl,

    #[error("Please provide a valid url")]
    InvalidUrl,

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Processing failed: {0}")]
    Process(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(ValidationError::MissingUrl) => AppError::MissingUrl,
            PipelineError::Validation(ValidationError::InvalidUrl(_)) => AppError::InvalidUrl,
            // Thresholds belong to the edge operation's contract
            PipelineError::Validation(e @ ValidationError::InvalidThreshold { .. }) => {
                AppError::Process(e.to_string())
            }
            PipelineError::Fetch(e) => AppError::Fetch(e.to_string()),
            PipelineError::Process(e) => AppError::Process(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MissingUrl => (StatusCode::UNPROCESSABLE_ENTITY, MISSING_URL.to_string()),
            AppError::InvalidUrl => (StatusCode::UNSUPPORTED_MEDIA_TYPE, INVALID_URL.to_string()),
            AppError::Fetch(msg) => {
                tracing::error!("Fetch error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    CANNOT_ELABORATE.to_string(),
                )
            }
            AppError::Process(msg) => {
                tracing::error!("Process error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, CANNOT_PROCESS.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, CANNOT_PROCESS.to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Converts a handler panic into the generic 500 body.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("💥 Handler panicked: {}", detail);

    AppError::Internal(format!("panic: {}", detail)).into_response()
}

//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use blackbox_core::domain::error::ErrorKind;
use blackbox_runner::PipelineError;
use serde_json::json;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// Request body could not be read as the expected JSON
    Rejected(JsonRejection),
    Pipeline(PipelineError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected(rejection) => rejection.status(),
            ApiError::Pipeline(err) => match err.kind {
                ErrorKind::InvalidInput(_) => StatusCode::BAD_REQUEST,
                ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ErrorKind::Upstream(_) | ErrorKind::AllTasksFailed { .. } => StatusCode::BAD_GATEWAY,
                ErrorKind::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::Rejected(rejection) => json!({ "error": rejection.body_text() }),
            ApiError::Pipeline(err) => {
                if status.is_server_error() {
                    tracing::error!("Request failed: {}", err);
                }
                json!({
                    "error": err.to_string(),
                    "stage": err.stage,
                    "kind": err.kind,
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Pipeline(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

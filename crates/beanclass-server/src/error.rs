//! HTTP error responses

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use beanclass_core::{Error, SourceError};
use serde_json::json;
use tracing::{error, warn};

/// Error returned by request handlers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Status code and error `type` reported to the client
    pub fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Core(Error::Validation(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error")
            }
            AppError::Core(Error::Source(_)) => (StatusCode::BAD_REQUEST, "source_error"),
            AppError::Core(Error::EmptyInput) | AppError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, "invalid_request_error")
            }
            AppError::Core(Error::Invocation(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "model_error")
            }
            AppError::Core(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<beanclass_core::ValidationError> for AppError {
    fn from(err: beanclass_core::ValidationError) -> Self {
        AppError::Core(err.into())
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::Core(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let message = self.to_string();

        if status.is_server_error() {
            error!(kind, %message, "Request failed");
        } else {
            warn!(kind, %message, "Request rejected");
        }
        metrics::counter!("beanclass_rejections_total", "kind" => kind).increment(1);

        let body = json!({
            "error": {
                "message": message,
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pulse_core::PulseError;
use serde_json::json;

/// Errors a handler can return. Every variant renders as `{"detail": ...}`.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    InvalidQuery(String),
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            AppError::NotFound(msg) | AppError::InvalidQuery(msg) | AppError::Internal(msg) => msg,
        }
    }
}

impl From<PulseError> for AppError {
    fn from(err: PulseError) -> Self {
        match err {
            PulseError::NotFound(_) => AppError::NotFound(err.to_string()),
            PulseError::Internal(msg) => AppError::Internal(msg),
            other => AppError::Internal(format!("Internal server error: {}", other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self.detail());
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

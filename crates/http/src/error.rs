//! Error handling for the bookshelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookshelf_db::StoreError;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Standard error envelope, serialized under an `error` key
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Vec<serde_json::Value>,
    pub trace_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    /// A required request field is absent or has the wrong shape.
    #[error("parameter error: {message}")]
    Parameter { message: String, code: String },

    /// The request body is not valid structured data.
    #[error("decode error: {message}")]
    Decode { message: String, code: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a parameter error
    pub fn missing_argument(message: impl Into<String>) -> Self {
        Self::Parameter {
            message: message.into(),
            code: "missing_argument".to_string(),
        }
    }

    /// Create a decode error
    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            code: "malformed_body".to_string(),
        }
    }

    fn parts(self) -> (StatusCode, String, String) {
        match self {
            AppError::Parameter { message, code } | AppError::Decode { message, code } => {
                (StatusCode::BAD_REQUEST, code, message)
            }
            AppError::Store(e @ StoreError::Unavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable".to_string(),
                e.to_string(),
            ),
            AppError::Store(e @ StoreError::Statement(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "statement_failed".to_string(),
                e.to_string(),
            ),
            AppError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error".to_string(),
                format!("{e:#}"),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let trace_id = Uuid::new_v4();
        let timestamp = OffsetDateTime::now_utc().to_string();
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(
                trace_id = %trace_id,
                error_code = %code,
                status_code = %status.as_u16(),
                error = %message,
                "request failed"
            );
        } else {
            tracing::warn!(
                trace_id = %trace_id,
                error_code = %code,
                status_code = %status.as_u16(),
                error = %message,
                "request rejected"
            );
        }

        // Release builds don't leak store or internal details to clients.
        let message = if cfg!(not(debug_assertions)) && status.is_server_error() {
            "An internal server error occurred".to_string()
        } else {
            message
        };

        let envelope = ErrorEnvelope {
            error: ErrorBody {
                code,
                message,
                details: Vec::new(),
                trace_id: trace_id.to_string(),
                timestamp,
            },
        };

        (status, Json(envelope)).into_response()
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Stable machine-readable error kind carried in every error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    CorruptContent,
    #[serde(rename = "InternalIO")]
    InternalIo,
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Corrupt content in {path}: {reason}")]
    CorruptContent { path: String, reason: String },

    #[error("Storage error on {path}: {source}")]
    InternalIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::BadRequest(_) => ErrorKind::BadRequest,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::CorruptContent { .. } => ErrorKind::CorruptContent,
            AppError::InternalIo { .. } => ErrorKind::InternalIo,
        }
    }

    pub fn corrupt(path: impl Into<String>, reason: impl ToString) -> Self {
        AppError::CorruptContent {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::InternalIo {
            path: path.into(),
            source,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // BadRequest and NotFound are expected outcomes, not faults.
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::CorruptContent { path, reason } => {
                tracing::error!("Corrupt content at {path}: {reason}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Content file is malformed or has an unrecognized format".to_string(),
                )
            }
            AppError::InternalIo { path, source } => {
                tracing::error!("Storage error at {path}: {source}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A storage error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "status": "error",
            "message": message,
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

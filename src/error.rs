use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error kinds shared by every store, service and adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    DuplicateKey,
    Validation,
    Timeout,
    Unexpected,
}

/// Kind -> (HTTP status, machine-readable code). Every kind has exactly one row.
const STATUS_TABLE: &[(ErrorKind, StatusCode, &str)] = &[
    (ErrorKind::Validation, StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
    (ErrorKind::NotFound, StatusCode::NOT_FOUND, "DATA_NOT_FOUND"),
    (ErrorKind::Timeout, StatusCode::REQUEST_TIMEOUT, "REQUEST_TIMEOUT"),
    (ErrorKind::DuplicateKey, StatusCode::CONFLICT, "DATA_DUPLICATE"),
    (ErrorKind::Unexpected, StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
];

const UNEXPECTED_MESSAGE: &str = "Internal server error";

impl ErrorKind {
    pub fn status_and_code(self) -> (StatusCode, &'static str) {
        STATUS_TABLE
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .map(|(_, status, code)| (*status, *code))
            .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::DuplicateKey(_) => ErrorKind::DuplicateKey,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Timeout(_) => ErrorKind::Timeout,
            AppError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Message safe to show to API clients.
    pub fn public_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::DuplicateKey(msg)
            | AppError::Validation(msg)
            | AppError::Timeout(msg) => msg.clone(),
            AppError::Unexpected(_) => UNEXPECTED_MESSAGE.to_string(),
        }
    }
}

impl From<crate::utils::cursor::CursorError> for AppError {
    fn from(err: crate::utils::cursor::CursorError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.kind().status_and_code();

        if let AppError::Unexpected(detail) = &self {
            tracing::error!(error = %detail, "Unexpected error while handling request");
        }

        let body = Json(json!({
            "code": code,
            "message": self.public_message(),
        }));

        (status, body).into_response()
    }
}

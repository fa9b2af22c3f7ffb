use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::templates::TemplateError;
use crate::shared::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// A failed operation, labelled with the message reported to the caller
    #[error("{message}: {source}")]
    Operation {
        message: String,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Attach the caller-facing message for the operation that failed.
    pub fn context(self, message: impl Into<String>) -> Self {
        AppError::Operation {
            message: message.into(),
            source: Box::new(self),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Storage(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Operation { source, .. } => source.status_code(),
        }
    }

    /// The underlying message, without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Storage(msg)
            | AppError::Database(msg)
            | AppError::Internal(msg) => msg,
            AppError::Operation { source, .. } => source.detail(),
        }
    }
}

impl From<TemplateError> for AppError {
    fn from(e: TemplateError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Upstream messages are passed through to the caller unmodified
        let body = match self {
            AppError::BadRequest(msg) | AppError::PayloadTooLarge(msg) => ErrorResponse::new(msg),
            AppError::Operation {
                ref message,
                ref source,
            } => {
                if status.is_server_error() {
                    tracing::error!("{}: {}", message, source);
                }
                ErrorResponse::with_error(message.clone(), source.detail())
            }
            other => {
                tracing::error!("{}", other);
                ErrorResponse::with_error("Internal server error", other.detail())
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

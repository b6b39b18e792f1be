use crate::services::{AuthServiceError, MagicLinkError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors surfaced to HTTP clients.
///
/// Every authentication failure maps to the same 401 body so callers cannot
/// tell an unknown token from an expired one or a vanished user.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<MagicLinkError> for AppError {
    fn from(err: MagicLinkError) -> Self {
        match err {
            MagicLinkError::InvalidEmail | MagicLinkError::MissingToken => {
                AppError::InvalidInput(err.to_string())
            }
            MagicLinkError::InvalidOrExpired => {
                AppError::Unauthenticated("Invalid or expired token")
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<AuthServiceError> for AppError {
    fn from(err: AuthServiceError) -> Self {
        if err.is_unauthenticated() {
            tracing::debug!("Rejected session credential: {}", err);
            AppError::Unauthenticated("Invalid or expired session")
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

//! Unified error handling.
//!
//! Provides a single `AppError` type that all route handlers return. Server
//! errors are logged with `tracing`; internal details are never exposed to
//! clients.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the treasury server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Auth(AuthError::Repository(_))
        ) {
            tracing::error!(error = %self, "request error");
        }

        let status = match &self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::LastSuperuser => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::InvalidToken => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::AlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidUsername(_) => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => "Record not found".to_owned(),
                RepositoryError::Conflict(msg) => msg.clone(),
                RepositoryError::LastSuperuser => err.to_string(),
                _ => "Internal server error".to_owned(),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_owned(),
                AuthError::InvalidToken => "Invalid or expired token".to_owned(),
                AuthError::AlreadyExists => "Username already taken".to_owned(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidUsername(e) => e.to_string(),
                _ => "Internal server error".to_owned(),
            },
            Self::Internal(_) => "Internal server error".to_owned(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg) => msg.clone(),
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

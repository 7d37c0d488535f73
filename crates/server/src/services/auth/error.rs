//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] treasury_core::UsernameError),

    /// Invalid credentials (wrong password or account not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Account already exists.
    #[error("username already taken")]
    AlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Bearer token missing, malformed, expired or tampered with.
    #[error("invalid token")]
    InvalidToken,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

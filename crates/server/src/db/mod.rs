//! Database operations for the treasury `SQLite` database.
//!
//! # Tables
//!
//! - `receipts` - Uploaded receipts with submitter fields and OCR guesses
//! - `admins` - Admin accounts with a superuser permission split
//!
//! # Migrations
//!
//! Migrations are embedded from `crates/server/migrations/` and run at server
//! startup or via `treasury-cli migrate`.

pub mod admins;
pub mod receipts;

pub use admins::AdminRepository;
pub use receipts::ReceiptRepository;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Refusing to delete the last remaining superuser.
    #[error("cannot delete the last superuser")]
    LastSuperuser,
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// Creates the database file when it does not exist yet.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    MIGRATOR.run(&pool).await.expect("migrations");
    pool
}

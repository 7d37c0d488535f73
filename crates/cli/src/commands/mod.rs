//! CLI subcommand implementations.

pub mod admin;
pub mod migrate;

use secrecy::SecretString;
use thiserror::Error;

/// Errors shared across CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Resolve the database URL from the environment.
///
/// Prefers `TREASURY_DATABASE_URL`, falls back to `DATABASE_URL`.
pub fn database_url() -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();

    std::env::var("TREASURY_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("TREASURY_DATABASE_URL"))
}

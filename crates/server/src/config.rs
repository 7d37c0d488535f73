//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TREASURY_DATABASE_URL` - `SQLite` connection string (falls back to
//!   `DATABASE_URL`)
//! - `TREASURY_TOKEN_SECRET` - Bearer token signing secret (min 32 chars)
//!
//! ## Optional
//! - `TREASURY_HOST` - Bind address (default: 127.0.0.1)
//! - `TREASURY_PORT` - Listen port (default: 8000)
//! - `TREASURY_TOKEN_TTL_HOURS` - Token lifetime (default: 24)
//! - `TREASURY_DEFAULT_ADMIN_USERNAME` / `TREASURY_DEFAULT_ADMIN_PASSWORD` -
//!   seed a superuser at startup when no admin account exists
//! - `TREASURY_UPLOAD_DIR` - Image storage directory (default: uploads)
//! - `TREASURY_MAX_UPLOAD_BYTES` - Upload size limit (default: 10 MiB)
//! - `TREASURY_CORS_ORIGINS` - Comma-separated origin allow-list
//! - `TREASURY_TESSERACT_CMD` - Recognition executable (default: tesseract)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "change-this",
    "replace",
    "placeholder",
    "example",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Treasury server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// `SQLite` database connection URL.
    pub database_url: SecretString,
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Bearer token signing secret.
    pub token_secret: SecretString,
    /// Bearer token lifetime in hours.
    pub token_ttl_hours: u32,
    /// Default admin credentials, seeded when no admin account exists.
    pub default_admin: Option<DefaultAdmin>,
    /// Directory where uploaded receipt images are stored.
    pub upload_dir: PathBuf,
    /// Maximum accepted upload body size in bytes.
    pub max_upload_bytes: usize,
    /// CORS origin allow-list. Empty means no cross-origin access.
    pub cors_origins: Vec<String>,
    /// Recognition engine executable.
    pub tesseract_cmd: PathBuf,
}

/// Default admin credentials for first-run seeding.
#[derive(Clone)]
pub struct DefaultAdmin {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("database_url", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("cors_origins", &self.cors_origins)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the token secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("TREASURY_DATABASE_URL")?;
        let host = get_env_or_default("TREASURY_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("TREASURY_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("TREASURY_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("TREASURY_PORT".to_owned(), e.to_string()))?;

        let token_secret = get_required_secret("TREASURY_TOKEN_SECRET")?;
        validate_token_secret(&token_secret, "TREASURY_TOKEN_SECRET")?;

        let token_ttl_hours = get_env_or_default("TREASURY_TOKEN_TTL_HOURS", "24")
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TREASURY_TOKEN_TTL_HOURS".to_owned(), e.to_string())
            })?;

        let default_admin = match (
            get_optional_env("TREASURY_DEFAULT_ADMIN_USERNAME"),
            get_optional_env("TREASURY_DEFAULT_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(DefaultAdmin {
                username,
                password: SecretString::from(password),
            }),
            _ => None,
        };

        let upload_dir = PathBuf::from(get_env_or_default("TREASURY_UPLOAD_DIR", "uploads"));
        let max_upload_bytes = get_env_or_default("TREASURY_MAX_UPLOAD_BYTES", "10485760")
            .parse::<usize>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TREASURY_MAX_UPLOAD_BYTES".to_owned(), e.to_string())
            })?;

        let cors_origins = get_optional_env("TREASURY_CORS_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();

        let tesseract_cmd =
            PathBuf::from(get_env_or_default("TREASURY_TESSERACT_CMD", "tesseract"));

        Ok(Self {
            database_url,
            host,
            port,
            token_secret,
            token_ttl_hours,
            default_admin,
            upload_dir,
            max_upload_bytes,
            cors_origins,
            tesseract_cmd,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    Ok(SecretString::from(get_required_env(key)?))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Split a comma-separated origin list, dropping empty entries.
fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Validate that the token secret is long enough and not a placeholder.
fn validate_token_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();

    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }

    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:5173, http://localhost:5174"),
            vec!["http://localhost:5173", "http://localhost:5174"]
        );
        assert_eq!(parse_origins(" , ,"), Vec::<String>::new());
    }

    #[test]
    fn test_token_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_token_secret(&secret, "TEST").is_err());
    }

    #[test]
    fn test_token_secret_placeholder() {
        let secret = SecretString::from("your-secret-key-change-this-in-production");
        assert!(validate_token_secret(&secret, "TEST").is_err());
    }

    #[test]
    fn test_token_secret_valid() {
        let secret = SecretString::from("k9mX2pQ7vR4tY8wZ1nB5cD3fG6hJ0aLs");
        assert!(validate_token_secret(&secret, "TEST").is_ok());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ServerConfig {
            database_url: SecretString::from("sqlite://secret.db"),
            host: "127.0.0.1".parse().expect("valid ip"),
            port: 8000,
            token_secret: SecretString::from("k9mX2pQ7vR4tY8wZ1nB5cD3fG6hJ0aLs"),
            token_ttl_hours: 24,
            default_admin: None,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
            cors_origins: vec![],
            tesseract_cmd: PathBuf::from("tesseract"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("secret.db"));
        assert!(!debug_output.contains("k9mX2pQ7"));
    }
}

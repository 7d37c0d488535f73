//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a superuser
//! treasury-cli admin create -u treasurer -p "long passphrase" --superuser
//!
//! # List accounts
//! treasury-cli admin list
//! ```

use thiserror::Error;

use treasury_core::Username;
use treasury_server::db::{self, AdminRepository, RepositoryError};
use treasury_server::services::auth::{AuthError, AuthService};

use super::CliError;

/// Errors that can occur during admin account operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Cli(#[from] CliError),

    /// Invalid username or password, or the account already exists.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// No account with the given username.
    #[error("No admin account with username: {0}")]
    NotFound(String),

    /// Refusing to delete the last remaining superuser.
    #[error("Cannot delete the last superuser: {0}")]
    LastSuperuser(String),

    /// Repository error.
    #[error("Database error: {0}")]
    Repository(RepositoryError),
}

/// Create a new admin account.
pub async fn create(username: &str, password: &str, is_superuser: bool) -> Result<(), AdminError> {
    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url)
        .await
        .map_err(CliError::from)?;

    let admin = AuthService::new(&pool)
        .create_admin(username, password, is_superuser)
        .await?;

    tracing::info!(
        "Admin account created: {} (id {}, superuser: {})",
        admin.username,
        admin.id,
        admin.is_superuser
    );
    Ok(())
}

/// List all admin accounts.
pub async fn list() -> Result<(), AdminError> {
    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url)
        .await
        .map_err(CliError::from)?;

    let admins = AdminRepository::new(&pool)
        .list_all()
        .await
        .map_err(AdminError::Repository)?;

    if admins.is_empty() {
        tracing::info!("No admin accounts");
        return Ok(());
    }

    for admin in admins {
        tracing::info!(
            "  {} (id {}, superuser: {}, created {})",
            admin.username,
            admin.id,
            admin.is_superuser,
            admin.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

/// Delete an admin account by username.
///
/// Deleting the last remaining superuser is refused.
pub async fn delete(username: &str) -> Result<(), AdminError> {
    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url)
        .await
        .map_err(CliError::from)?;

    let repo = AdminRepository::new(&pool);

    let parsed = Username::parse(username)
        .map_err(|_| AdminError::NotFound(username.to_owned()))?;
    let admin = repo
        .get_by_username(&parsed)
        .await
        .map_err(AdminError::Repository)?
        .ok_or_else(|| AdminError::NotFound(username.to_owned()))?;

    repo.delete(admin.id).await.map_err(|e| match e {
        RepositoryError::LastSuperuser => AdminError::LastSuperuser(username.to_owned()),
        RepositoryError::NotFound => AdminError::NotFound(username.to_owned()),
        other => AdminError::Repository(other),
    })?;

    tracing::info!("Admin account deleted: {username}");
    Ok(())
}

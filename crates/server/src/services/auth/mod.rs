//! Authentication service.
//!
//! Password hashing/verification and account management over the admin
//! repository. Token issuance lives in [`token`].

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenService};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use treasury_core::Username;

use crate::config::DefaultAdmin;
use crate::db::{AdminRepository, RepositoryError};
use crate::models::admin::Admin;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    admins: AdminRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            admins: AdminRepository::new(pool),
        }
    }

    /// Create a new admin account with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::AlreadyExists` if the username is taken.
    pub async fn create_admin(
        &self,
        username: &str,
        password: &str,
        is_superuser: bool,
    ) -> Result<Admin, AuthError> {
        let username = Username::parse(username)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let admin = self
            .admins
            .create(&username, &password_hash, is_superuser)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(admin)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is
    /// wrong. The same error covers unknown usernames so login failures do
    /// not reveal which accounts exist.
    pub async fn login(&self, username: &str, password: &str) -> Result<Admin, AuthError> {
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let admin = self
            .admins
            .get_by_username(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &admin.password_hash)?;

        Ok(admin)
    }

    /// Seed the default superuser when no admin account exists yet.
    ///
    /// Returns whether an account was created.
    pub async fn seed_default_admin(
        &self,
        default_admin: &DefaultAdmin,
    ) -> Result<bool, AuthError> {
        use secrecy::ExposeSecret;

        if self.admins.count().await? > 0 {
            return Ok(false);
        }

        let admin = self
            .create_admin(
                &default_admin.username,
                default_admin.password.expose_secret(),
                true,
            )
            .await?;

        tracing::info!(username = %admin.username, "seeded default superuser");
        Ok(true)
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with Argon2id into PHC string format.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::PasswordHash)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash.
fn verify_password(password: &str, password_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(password_hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

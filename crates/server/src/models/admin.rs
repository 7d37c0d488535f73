//! Admin account domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use treasury_core::{AdminId, Username};

/// An admin account (domain type).
///
/// The password hash never leaves the repository/auth layer; API responses
/// use [`AdminView`].
#[derive(Debug, Clone)]
pub struct Admin {
    /// Unique admin ID.
    pub id: AdminId,
    /// Unique username.
    pub username: Username,
    /// Argon2 password hash in PHC string format.
    pub password_hash: String,
    /// Whether this admin may manage other admin accounts.
    pub is_superuser: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Admin identity carried by a verified bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: AdminId,
    pub username: String,
    pub is_superuser: bool,
}

impl Admin {
    /// Public view of this account, without the password hash.
    #[must_use]
    pub fn view(&self) -> AdminView {
        AdminView {
            id: self.id,
            username: self.username.to_string(),
            is_superuser: self.is_superuser,
            created_at: self.created_at,
        }
    }
}

/// API representation of an admin account.
#[derive(Debug, Clone, Serialize)]
pub struct AdminView {
    pub id: AdminId,
    pub username: String,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

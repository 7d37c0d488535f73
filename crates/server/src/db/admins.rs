//! Admin account repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use treasury_core::{AdminId, Username};

use super::RepositoryError;
use crate::models::admin::Admin;

/// Internal row type for admin queries.
#[derive(Debug, sqlx::FromRow)]
struct AdminRow {
    id: i64,
    username: String,
    password_hash: String,
    is_superuser: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminRow> for Admin {
    type Error = RepositoryError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: AdminId::new(row.id),
            username,
            password_hash: row.password_hash,
            is_superuser: row.is_superuser,
            created_at: row.created_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, username, password_hash, is_superuser, created_at";

/// Repository for admin account database operations.
pub struct AdminRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all admin accounts, oldest first.
    pub async fn list_all(&self) -> Result<Vec<Admin>, RepositoryError> {
        let rows: Vec<AdminRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM admins ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an admin by their ID.
    pub async fn get_by_id(&self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        let row: Option<AdminRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM admins WHERE id = ?"))
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an admin by their username.
    pub async fn get_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Admin>, RepositoryError> {
        let row: Option<AdminRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM admins WHERE username = ?"
        ))
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Count all admin accounts.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Create a new admin account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        is_superuser: bool,
    ) -> Result<Admin, RepositoryError> {
        let row: AdminRow = sqlx::query_as(&format!(
            "INSERT INTO admins (username, password_hash, is_superuser, created_at) \
             VALUES (?, ?, ?, ?) \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(username.as_str())
        .bind(password_hash)
        .bind(is_superuser)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Delete an admin account by its ID.
    ///
    /// Runs inside a transaction so the superuser count and the delete are
    /// consistent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::LastSuperuser` when the account is the sole
    /// remaining superuser; at least one superuser must exist at all times.
    /// Returns `RepositoryError::NotFound` if the account doesn't exist.
    pub async fn delete(&self, id: AdminId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<AdminRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM admins WHERE id = ?"))
                .bind(id.as_i64())
                .fetch_optional(&mut *tx)
                .await?;
        let row = row.ok_or(RepositoryError::NotFound)?;

        if row.is_superuser {
            let superusers: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM admins WHERE is_superuser = 1")
                    .fetch_one(&mut *tx)
                    .await?;
            if superusers <= 1 {
                return Err(RepositoryError::LastSuperuser);
            }
        }

        sqlx::query("DELETE FROM admins WHERE id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

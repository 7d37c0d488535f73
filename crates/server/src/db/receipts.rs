//! Receipt repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use treasury_core::ReceiptId;

use super::RepositoryError;
use crate::models::receipt::{NewReceipt, Receipt, ReceiptUpdate};

/// Internal row type for receipt queries.
#[derive(Debug, sqlx::FromRow)]
struct ReceiptRow {
    id: i64,
    user_name: String,
    user_phone: String,
    item_bought: String,
    approved_by: String,
    ocr_price: Option<f64>,
    ocr_date: Option<String>,
    ocr_time: Option<String>,
    ocr_raw_text: Option<String>,
    image_path: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReceiptRow> for Receipt {
    fn from(row: ReceiptRow) -> Self {
        Self {
            id: ReceiptId::new(row.id),
            user_name: row.user_name,
            user_phone: row.user_phone,
            item_bought: row.item_bought,
            approved_by: row.approved_by,
            ocr_price: row.ocr_price,
            ocr_date: row.ocr_date,
            ocr_time: row.ocr_time,
            ocr_raw_text: row.ocr_raw_text,
            image_path: row.image_path,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = "id, user_name, user_phone, item_bought, approved_by, \
     ocr_price, ocr_date, ocr_time, ocr_raw_text, image_path, created_at, updated_at";

/// Repository for receipt database operations.
pub struct ReceiptRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReceiptRepository<'a> {
    /// Create a new receipt repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all receipts, newest first.
    pub async fn list_all(&self) -> Result<Vec<Receipt>, RepositoryError> {
        let rows: Vec<ReceiptRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM receipts ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a receipt by its ID.
    pub async fn get_by_id(&self, id: ReceiptId) -> Result<Option<Receipt>, RepositoryError> {
        let row: Option<ReceiptRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM receipts WHERE id = ?"))
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(Into::into))
    }

    /// Insert a new receipt.
    pub async fn create(&self, new: &NewReceipt) -> Result<Receipt, RepositoryError> {
        let now = Utc::now();

        let row: ReceiptRow = sqlx::query_as(&format!(
            "INSERT INTO receipts (user_name, user_phone, item_bought, approved_by, \
                 ocr_price, ocr_date, ocr_time, ocr_raw_text, image_path, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(&new.user_name)
        .bind(&new.user_phone)
        .bind(&new.item_bought)
        .bind(&new.approved_by)
        .bind(new.ocr_price)
        .bind(&new.ocr_date)
        .bind(&new.ocr_time)
        .bind(&new.ocr_raw_text)
        .bind(&new.image_path)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Apply a partial update to a receipt.
    ///
    /// Update semantics live in [`ReceiptUpdate::apply`]; the row is read,
    /// mutated and written back with a fresh `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the receipt doesn't exist.
    pub async fn update(
        &self,
        id: ReceiptId,
        update: &ReceiptUpdate,
    ) -> Result<Receipt, RepositoryError> {
        let mut receipt = self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)?;

        update.apply(&mut receipt);
        receipt.updated_at = Utc::now();

        let result = sqlx::query(
            "UPDATE receipts SET user_name = ?, user_phone = ?, item_bought = ?, \
                 approved_by = ?, ocr_price = ?, ocr_date = ?, ocr_time = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&receipt.user_name)
        .bind(&receipt.user_phone)
        .bind(&receipt.item_bought)
        .bind(&receipt.approved_by)
        .bind(receipt.ocr_price)
        .bind(&receipt.ocr_date)
        .bind(&receipt.ocr_time)
        .bind(receipt.updated_at)
        .bind(id.as_i64())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(receipt)
    }

    /// Delete a receipt by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the receipt doesn't exist.
    pub async fn delete(&self, id: ReceiptId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM receipts WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

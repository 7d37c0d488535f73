//! Receipt route handlers: upload, list, update, delete, bulk delete.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use treasury_core::ReceiptId;

use crate::db::{ReceiptRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::receipt::{NewReceipt, Receipt, ReceiptUpdate};
use crate::state::AppState;

/// API representation of a receipt.
#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub id: ReceiptId,
    pub user_name: String,
    pub user_phone: String,
    pub item_bought: String,
    pub approved_by: String,
    pub ocr_price: Option<f64>,
    pub ocr_date: Option<String>,
    pub ocr_time: Option<String>,
    pub ocr_raw_text: Option<String>,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Receipt> for ReceiptResponse {
    fn from(receipt: Receipt) -> Self {
        let image_url = format!("/uploads/{}", receipt.image_path);
        Self {
            id: receipt.id,
            user_name: receipt.user_name,
            user_phone: receipt.user_phone,
            item_bought: receipt.item_bought,
            approved_by: receipt.approved_by,
            ocr_price: receipt.ocr_price,
            ocr_date: receipt.ocr_date,
            ocr_time: receipt.ocr_time,
            ocr_raw_text: receipt.ocr_raw_text,
            image_url,
            created_at: receipt.created_at,
            updated_at: receipt.updated_at,
        }
    }
}

/// OCR fields echoed back after an upload.
#[derive(Debug, Serialize)]
pub struct OcrData {
    pub ocr_price: Option<f64>,
    pub ocr_date: Option<String>,
    pub ocr_time: Option<String>,
    pub ocr_raw_text: String,
}

/// Upload response body.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub receipt_id: ReceiptId,
    pub ocr_data: OcrData,
}

/// List response body.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub receipts: Vec<ReceiptResponse>,
}

/// Update response body.
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub message: &'static str,
    pub receipt: ReceiptResponse,
}

/// Single delete response body.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
    pub id: ReceiptId,
}

/// Bulk delete response body.
#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub message: String,
    pub deleted_count: usize,
    pub errors: Option<Vec<String>>,
}

/// Public endpoint: upload a receipt image with submitter fields.
///
/// The image is persisted first, then extraction runs on a blocking thread
/// (three to four recognition passes). Extraction failures never fail the
/// upload; they degrade to absent fields plus a diagnostic raw text.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut image: Option<(String, Vec<u8>)> = None;
    let mut user_name = None;
    let mut user_phone = None;
    let mut item_bought = None;
    let mut approved_by = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(ToOwned::to_owned);
        match name.as_deref() {
            Some("image") => {
                let content_type = field.content_type().map(ToOwned::to_owned);
                if !content_type.as_deref().is_some_and(|ct| ct.starts_with("image/")) {
                    return Err(AppError::BadRequest("only image files allowed".to_owned()));
                }
                let file_name = field.file_name().unwrap_or("receipt").to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("failed to read image: {e}")))?;
                image = Some((file_name, bytes.to_vec()));
            }
            Some(text_field @ ("user_name" | "user_phone" | "item_bought" | "approved_by")) => {
                let text_field = text_field.to_owned();
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid field: {e}")))?;
                match text_field.as_str() {
                    "user_name" => user_name = Some(value),
                    "user_phone" => user_phone = Some(value),
                    "item_bought" => item_bought = Some(value),
                    _ => approved_by = Some(value),
                }
            }
            _ => {}
        }
    }

    let (file_name, image_bytes) =
        image.ok_or_else(|| AppError::BadRequest("image file is required".to_owned()))?;
    let user_name = require_field(user_name, "user_name")?;
    let user_phone = require_field(user_phone, "user_phone")?;
    let item_bought = require_field(item_bought, "item_bought")?;
    let approved_by = require_field(approved_by, "approved_by")?;

    let image_path = state
        .images()
        .save(&file_name, &image_bytes)
        .map_err(|e| AppError::Internal(format!("failed to store image: {e}")))?;

    // The recognition passes block; keep them off the async workers.
    let extractor = state.extractor().clone();
    let extracted = tokio::task::spawn_blocking(move || extractor.extract(&image_bytes))
        .await
        .map_err(|e| AppError::Internal(format!("extraction task failed: {e}")))?;

    let repo = ReceiptRepository::new(state.pool());
    let receipt = repo
        .create(&NewReceipt {
            user_name,
            user_phone,
            item_bought,
            approved_by,
            ocr_price: extracted.price,
            ocr_date: extracted.date.clone(),
            ocr_time: extracted.time.clone(),
            ocr_raw_text: Some(extracted.raw_text.clone()),
            image_path,
        })
        .await?;

    tracing::info!(receipt_id = %receipt.id, "receipt uploaded");

    Ok(Json(UploadResponse {
        message: "Receipt uploaded successfully",
        receipt_id: receipt.id,
        ocr_data: OcrData {
            ocr_price: extracted.price,
            ocr_date: extracted.date,
            ocr_time: extracted.time,
            ocr_raw_text: extracted.raw_text,
        },
    }))
}

/// Admin endpoint: list all receipts, newest first.
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ListResponse>> {
    let receipts = ReceiptRepository::new(state.pool()).list_all().await?;

    Ok(Json(ListResponse {
        receipts: receipts.into_iter().map(Into::into).collect(),
    }))
}

/// Admin endpoint: partially update a receipt.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ReceiptUpdate>,
) -> Result<Json<UpdateResponse>> {
    let receipt = ReceiptRepository::new(state.pool())
        .update(ReceiptId::new(id), &body)
        .await
        .map_err(not_found_message)?;

    Ok(Json(UpdateResponse {
        message: "Receipt updated successfully",
        receipt: receipt.into(),
    }))
}

/// Admin endpoint: delete a single receipt and its stored image.
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>> {
    let id = ReceiptId::new(id);
    let repo = ReceiptRepository::new(state.pool());

    let receipt = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Receipt not found".to_owned()))?;

    state.images().delete(&receipt.image_path);
    repo.delete(id).await.map_err(not_found_message)?;

    Ok(Json(DeleteResponse {
        message: "Receipt deleted successfully",
        id,
    }))
}

/// Admin endpoint: delete multiple receipts, collecting per-id errors.
pub async fn bulk_delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(receipt_ids): Json<Vec<i64>>,
) -> Result<Json<BulkDeleteResponse>> {
    if receipt_ids.is_empty() {
        return Err(AppError::BadRequest("No receipt IDs provided".to_owned()));
    }

    let repo = ReceiptRepository::new(state.pool());
    let mut deleted_count = 0;
    let mut errors = Vec::new();

    for raw_id in receipt_ids {
        let id = ReceiptId::new(raw_id);
        match repo.get_by_id(id).await? {
            Some(receipt) => {
                state.images().delete(&receipt.image_path);
                match repo.delete(id).await {
                    Ok(()) => deleted_count += 1,
                    Err(e) => errors.push(format!("Error deleting receipt {raw_id}: {e}")),
                }
            }
            None => errors.push(format!("Receipt {raw_id} not found")),
        }
    }

    Ok(Json(BulkDeleteResponse {
        message: format!("Deleted {deleted_count} receipt(s) successfully"),
        deleted_count,
        errors: if errors.is_empty() { None } else { Some(errors) },
    }))
}

fn require_field(value: Option<String>, name: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{name} is required")))
}

fn not_found_message(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("Receipt not found".to_owned()),
        other => AppError::Database(other),
    }
}

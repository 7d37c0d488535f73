//! Receipt domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use treasury_core::ReceiptId;

/// An uploaded receipt (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    /// Unique receipt ID.
    pub id: ReceiptId,
    /// Name of the person who submitted the receipt.
    pub user_name: String,
    /// Submitter's phone number (free text).
    pub user_phone: String,
    /// Description of the purchased item.
    pub item_bought: String,
    /// Name of the approver.
    pub approved_by: String,
    /// OCR price guess.
    pub ocr_price: Option<f64>,
    /// OCR date guess, verbatim from the receipt text.
    pub ocr_date: Option<String>,
    /// OCR time guess, verbatim from the receipt text.
    pub ocr_time: Option<String>,
    /// Full recognized text, kept for manual correction.
    pub ocr_raw_text: Option<String>,
    /// Relative path of the stored image file.
    pub image_path: String,
    /// When the receipt was uploaded.
    pub created_at: DateTime<Utc>,
    /// When the receipt was last edited.
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a new receipt.
#[derive(Debug, Clone)]
pub struct NewReceipt {
    pub user_name: String,
    pub user_phone: String,
    pub item_bought: String,
    pub approved_by: String,
    pub ocr_price: Option<f64>,
    pub ocr_date: Option<String>,
    pub ocr_time: Option<String>,
    pub ocr_raw_text: Option<String>,
    pub image_path: String,
}

/// Partial update from the admin review screen.
///
/// Submitted fields only change when present and non-empty; the price changes
/// whenever present (the admin may correct a wrong guess to any value); date
/// and time change when present and non-empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReceiptUpdate {
    pub user_name: Option<String>,
    pub user_phone: Option<String>,
    pub item_bought: Option<String>,
    pub approved_by: Option<String>,
    pub ocr_price: Option<f64>,
    pub ocr_date: Option<String>,
    pub ocr_time: Option<String>,
}

impl ReceiptUpdate {
    /// Apply this update to a receipt, returning whether anything changed.
    pub fn apply(&self, receipt: &mut Receipt) -> bool {
        let mut changed = false;

        for (source, target) in [
            (&self.user_name, &mut receipt.user_name),
            (&self.user_phone, &mut receipt.user_phone),
            (&self.item_bought, &mut receipt.item_bought),
            (&self.approved_by, &mut receipt.approved_by),
        ] {
            if let Some(value) = source
                && !value.is_empty()
                && value.as_str() != target.as_str()
            {
                *target = value.clone();
                changed = true;
            }
        }

        if let Some(price) = self.ocr_price
            && receipt.ocr_price != Some(price)
        {
            receipt.ocr_price = Some(price);
            changed = true;
        }

        if let Some(date) = &self.ocr_date
            && !date.is_empty()
            && receipt.ocr_date.as_ref() != Some(date)
        {
            receipt.ocr_date = Some(date.clone());
            changed = true;
        }

        if let Some(time) = &self.ocr_time
            && !time.is_empty()
            && receipt.ocr_time.as_ref() != Some(time)
        {
            receipt.ocr_time = Some(time.clone());
            changed = true;
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_receipt() -> Receipt {
        Receipt {
            id: ReceiptId::new(1),
            user_name: "Jane".to_owned(),
            user_phone: "555-0100".to_owned(),
            item_bought: "Paint".to_owned(),
            approved_by: "Bob".to_owned(),
            ocr_price: Some(10.0),
            ocr_date: Some("1/2/2024".to_owned()),
            ocr_time: None,
            ocr_raw_text: Some("Paint 10.00".to_owned()),
            image_path: "r.png".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_strings_do_not_clear_submitted_fields() {
        let mut receipt = sample_receipt();
        let update = ReceiptUpdate {
            user_name: Some(String::new()),
            ..Default::default()
        };

        assert!(!update.apply(&mut receipt));
        assert_eq!(receipt.user_name, "Jane");
    }

    #[test]
    fn test_price_updates_when_present() {
        let mut receipt = sample_receipt();
        let update = ReceiptUpdate {
            ocr_price: Some(12.5),
            ..Default::default()
        };

        assert!(update.apply(&mut receipt));
        assert_eq!(receipt.ocr_price, Some(12.5));
    }

    #[test]
    fn test_submitted_field_updates() {
        let mut receipt = sample_receipt();
        let update = ReceiptUpdate {
            item_bought: Some("Brushes".to_owned()),
            ocr_time: Some("2:30 PM".to_owned()),
            ..Default::default()
        };

        assert!(update.apply(&mut receipt));
        assert_eq!(receipt.item_bought, "Brushes");
        assert_eq!(receipt.ocr_time.as_deref(), Some("2:30 PM"));
    }

    #[test]
    fn test_noop_update() {
        let mut receipt = sample_receipt();
        assert!(!ReceiptUpdate::default().apply(&mut receipt));
    }
}

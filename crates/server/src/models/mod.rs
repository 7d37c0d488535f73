//! Domain models for receipts and admin accounts.

pub mod admin;
pub mod receipt;

pub use admin::{Admin, AdminView, CurrentAdmin};
pub use receipt::{NewReceipt, Receipt, ReceiptUpdate};

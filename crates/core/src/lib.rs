//! Treasury Core - Shared types library.
//!
//! This crate provides common types used across all treasury components:
//! - `server` - HTTP service for receipt upload and admin review
//! - `ocr` - Receipt field extraction
//! - `cli` - Command-line tools for migrations and admin management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and usernames

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! API route handlers and router assembly.

pub mod admins;
pub mod auth;
pub mod receipts;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Build the `/api` routes.
///
/// The upload endpoint gets its own body limit; everything else stays at the
/// framework default.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/login", post(auth::login))
        .route(
            "/api/receipts/upload",
            post(receipts::upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/receipts", get(receipts::list))
        .route("/api/receipts/bulk-delete", post(receipts::bulk_delete))
        .route(
            "/api/receipts/{id}",
            put(receipts::update).delete(receipts::remove),
        )
        .route("/api/admins", get(admins::list).post(admins::create))
        .route("/api/admins/{id}", delete(admins::remove))
}

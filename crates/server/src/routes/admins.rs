//! Admin account management route handlers (superuser only).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use treasury_core::AdminId;

use crate::db::{AdminRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireSuperuser;
use crate::models::admin::{Admin, AdminView};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// List response body.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub admins: Vec<AdminView>,
}

/// Account creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_superuser: bool,
}

/// Delete response body.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
    pub id: AdminId,
}

/// Superuser endpoint: list all admin accounts. Password hashes never leave
/// the repository layer.
pub async fn list(
    RequireSuperuser(_admin): RequireSuperuser,
    State(state): State<AppState>,
) -> Result<Json<ListResponse>> {
    let admins = AdminRepository::new(state.pool()).list_all().await?;

    Ok(Json(ListResponse {
        admins: admins.iter().map(Admin::view).collect(),
    }))
}

/// Superuser endpoint: create a new admin account.
pub async fn create(
    RequireSuperuser(_admin): RequireSuperuser,
    State(state): State<AppState>,
    Json(body): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<AdminView>)> {
    let auth = AuthService::new(state.pool());
    let admin = auth
        .create_admin(&body.username, &body.password, body.is_superuser)
        .await?;

    tracing::info!(username = %admin.username, is_superuser = admin.is_superuser, "admin account created");

    Ok((StatusCode::CREATED, Json(admin.view())))
}

/// Superuser endpoint: delete an admin account.
///
/// Deleting the last remaining superuser is refused so the system can never
/// lock itself out of admin management.
pub async fn remove(
    RequireSuperuser(_admin): RequireSuperuser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>> {
    let id = AdminId::new(id);

    AdminRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Admin not found".to_owned()),
            other => AppError::Database(other),
        })?;

    Ok(Json(DeleteResponse {
        message: "Admin deleted successfully",
        id,
    }))
}

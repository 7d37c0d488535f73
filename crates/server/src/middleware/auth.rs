//! Authentication extractors.
//!
//! Route handlers require authentication by taking [`RequireAdmin`] or
//! [`RequireSuperuser`] as an argument. Both validate the `Authorization:
//! Bearer` header against the token service.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::models::admin::CurrentAdmin;
use crate::state::AppState;

/// Extractor that requires a valid admin bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.username)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts, state)?;
        Ok(Self(admin))
    }
}

/// Extractor that additionally requires the superuser role.
///
/// Admin-management endpoints are gated on this; a valid token without the
/// superuser claim is rejected with 403.
pub struct RequireSuperuser(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireSuperuser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts, state)?;
        if !admin.is_superuser {
            return Err(AppError::Forbidden(
                "superuser privileges required".to_owned(),
            ));
        }
        Ok(Self(admin))
    }
}

/// Pull the bearer token from the request and validate it.
fn current_admin(parts: &Parts, state: &AppState) -> Result<CurrentAdmin, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_owned()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("expected bearer token".to_owned()))?;

    Ok(state.tokens().verify(token)?)
}

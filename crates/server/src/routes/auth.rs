//! Login route handler.

use axum::{Form, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Login form fields.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Admin login: exchanges username/password for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<LoginResponse>> {
    let auth = AuthService::new(state.pool());
    let admin = auth.login(&form.username, &form.password).await?;

    let access_token = state.tokens().issue(&admin)?;
    tracing::info!(username = %admin.username, "admin logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer",
    }))
}

//! Treasury server library.
//!
//! Receipt upload with best-effort OCR field extraction, admin review over a
//! bearer-token API, and admin account management with a superuser split.
//! Exposed as a library so the CLI and tests can reuse the configuration,
//! database and service layers.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::{Json, Router, routing::get};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use state::AppState;

/// Build the full application router over the given state.
///
/// Wires the API routes, the stored-image file service under `/uploads`,
/// request tracing and the CORS allow-list from configuration.
#[must_use]
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origins);
    let uploads = ServeDir::new(&state.config().upload_dir);

    Router::new()
        .route("/", get(root))
        .route("/health/ready", get(readiness))
        .merge(routes::routes(state.config().max_upload_bytes))
        .nest_service("/uploads", uploads)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", u64::try_from(latency.as_millis()).unwrap_or(u64::MAX));
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// CORS layer from the configured origin allow-list. An empty list means no
/// cross-origin access.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Service identification, doubling as a liveness check.
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "treasury",
        "status": "ok",
    }))
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;
    use std::path::PathBuf;

    use axum::body::Body;
    use axum::http::Request;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use crate::config::ServerConfig;

    async fn test_app() -> (Router, tempfile::TempDir) {
        let pool = crate::db::test_pool().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ServerConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse::<IpAddr>().expect("valid ip"),
            port: 0,
            token_secret: SecretString::from("k9mX2pQ7vR4tY8wZ1nB5cD3fG6hJ0aLs"),
            token_ttl_hours: 24,
            default_admin: None,
            upload_dir: dir.path().join("uploads"),
            max_upload_bytes: 1024 * 1024,
            cors_origins: vec!["http://localhost:5173".to_owned()],
            tesseract_cmd: PathBuf::from("tesseract"),
        };
        let state = AppState::new(config, pool).expect("app state");
        (app(state), dir)
    }

    #[tokio::test]
    async fn test_root_reports_ok() {
        let (app, _dir) = test_app().await;

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_readiness_with_live_pool() {
        let (app, _dir) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let (app, _dir) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/receipts")
                    .header("origin", "http://localhost:5173")
                    .header("access-control-request-method", "GET")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:5173")
        );
    }

    #[tokio::test]
    async fn test_cors_denies_unlisted_origin() {
        let (app, _dir) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/receipts")
                    .header("origin", "http://evil.example")
                    .header("access-control-request-method", "GET")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert!(
            response
                .headers()
                .get("access-control-allow-origin")
                .is_none()
        );
    }
}

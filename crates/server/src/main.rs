//! Treasury server binary.
//!
//! Serves the receipt upload and admin review API.
//!
//! # Architecture
//!
//! - Axum web framework
//! - `SQLite` for receipts and admin accounts
//! - Tesseract (external executable) for receipt text recognition
//! - Bearer tokens for admin authentication

#![cfg_attr(not(test), forbid(unsafe_code))]

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use treasury_server::config::ServerConfig;
use treasury_server::services::auth::AuthService;
use treasury_server::state::AppState;
use treasury_server::{app, db};

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "treasury_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize database connection pool and bring the schema up to date
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    db::MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    tracing::info!("Database ready");

    // First-run superuser, when configured and no account exists yet
    if let Some(default_admin) = &config.default_admin {
        AuthService::new(&pool)
            .seed_default_admin(default_admin)
            .await
            .expect("Failed to seed default admin");
    }

    let addr = config.socket_addr();
    let state = AppState::new(config, pool).expect("Failed to create application state");
    let app = app(state);

    tracing::info!("treasury listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

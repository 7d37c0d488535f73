//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;
use treasury_ocr::ReceiptExtractor;

use crate::config::ServerConfig;
use crate::services::auth::TokenService;
use crate::storage::ImageStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; provides access to the database pool,
/// configuration, token service, image store and receipt extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: SqlitePool,
    tokens: TokenService,
    images: ImageStore,
    extractor: ReceiptExtractor,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload directory cannot be created.
    pub fn new(config: ServerConfig, pool: SqlitePool) -> std::io::Result<Self> {
        let tokens = TokenService::new(&config.token_secret, config.token_ttl_hours);
        let images = ImageStore::new(&config.upload_dir)?;
        let extractor = ReceiptExtractor::tesseract(&config.tesseract_cmd);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                images,
                extractor,
            }),
        })
    }

    /// Create a state with a custom extractor (used by tests to avoid a real
    /// recognition engine).
    pub fn with_extractor(
        config: ServerConfig,
        pool: SqlitePool,
        extractor: ReceiptExtractor,
    ) -> std::io::Result<Self> {
        let tokens = TokenService::new(&config.token_secret, config.token_ttl_hours);
        let images = ImageStore::new(&config.upload_dir)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                images,
                extractor,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get a reference to the image store.
    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.inner.images
    }

    /// Get a reference to the receipt extractor.
    #[must_use]
    pub fn extractor(&self) -> &ReceiptExtractor {
        &self.inner.extractor
    }
}

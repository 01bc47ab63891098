//! Application state with a shared `AssetService`.
//!
//! [`AppState`] wraps the service in `Arc<tokio::sync::Mutex<>>` for use with
//! axum handlers. Every handler holds the lock for the whole
//! load-modify-save cycle of its operation, so at most one request touches
//! the document, images or backups at a time. Uses `tokio::sync::Mutex`
//! (async-aware) so waiting handlers do not block the runtime.

use std::sync::Arc;

use inkgraph_storage::StorageLayout;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::service::AssetService;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// The shared asset service (async Mutex, the single writer).
    pub service: Arc<tokio::sync::Mutex<AssetService>>,
    /// Layout of the data root, used to serve image files directly.
    pub layout: StorageLayout,
    /// Request body limit in bytes.
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Creates the state for the data root named in `config`.
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let layout = config
            .layout()
            .map_err(|e| ApiError::InternalError(format!("invalid storage layout: {}", e)))?;
        Ok(Self::from_service(
            AssetService::new(layout.clone()),
            layout,
            config.max_upload_bytes,
        ))
    }

    /// Creates the state around an existing service.
    pub fn from_service(service: AssetService, layout: StorageLayout, max_upload_bytes: usize) -> Self {
        AppState {
            service: Arc::new(tokio::sync::Mutex::new(service)),
            layout,
            max_upload_bytes,
        }
    }
}

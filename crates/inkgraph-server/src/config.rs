//! Server configuration from environment variables.
//!
//! - `INKGRAPH_ROOT`: data root holding `data.json`, `images/` and
//!   `backups/` (default: ".")
//! - `INKGRAPH_PORT`: listen port (default: "8007")
//! - `INKGRAPH_IMAGE_EXT`: extension for stored uploads (default: "png")
//! - `INKGRAPH_MAX_UPLOAD_BYTES`: request body limit (default: 20 MiB)

use std::path::PathBuf;

use inkgraph_storage::layout::DEFAULT_IMAGE_EXTENSION;
use inkgraph_storage::{StorageError, StorageLayout};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8007;

/// Default request body limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// A configuration value could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Settings for one server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub root: PathBuf,
    pub port: u16,
    pub image_extension: String,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            root: PathBuf::from("."),
            port: DEFAULT_PORT,
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from any variable lookup; unset variables
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = ServerConfig::default();

        if let Some(root) = lookup("INKGRAPH_ROOT") {
            config.root = PathBuf::from(root);
        }
        if let Some(port) = lookup("INKGRAPH_PORT") {
            config.port = port.trim().parse().map_err(|e| ConfigError::Invalid {
                var: "INKGRAPH_PORT",
                reason: format!("'{}': {}", port, e),
            })?;
        }
        if let Some(ext) = lookup("INKGRAPH_IMAGE_EXT") {
            config.image_extension = ext;
        }
        if let Some(limit) = lookup("INKGRAPH_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = limit.trim().parse().map_err(|e| ConfigError::Invalid {
                var: "INKGRAPH_MAX_UPLOAD_BYTES",
                reason: format!("'{}': {}", limit, e),
            })?;
        }

        // fail at startup rather than on the first upload
        config.layout().map_err(|e| ConfigError::Invalid {
            var: "INKGRAPH_IMAGE_EXT",
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    /// The storage layout under the configured root.
    pub fn layout(&self) -> Result<StorageLayout, StorageError> {
        StorageLayout::new(&self.root).with_image_extension(&self.image_extension)
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

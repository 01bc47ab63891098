//! On-disk layout of a data root.
//!
//! ```text
//! <root>/data.json                       the durable document
//! <root>/images/<node>_<index>.<ext>     image assets
//! <root>/backups/data_<timestamp>.json   pre-overwrite backups
//! ```

use std::path::{Path, PathBuf};

use inkgraph_core::{ImageReference, IMAGES_DIR};

use crate::error::StorageError;

/// File name of the durable document.
pub const DOCUMENT_FILE: &str = "data.json";

/// Directory holding backups.
pub const BACKUPS_DIR: &str = "backups";

/// Extension given to stored uploads unless configured otherwise.
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// Paths of everything stored under one data root.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
    image_extension: String,
}

impl StorageLayout {
    /// Creates a layout rooted at `root` with the default image extension.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StorageLayout {
            root: root.into(),
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
        }
    }

    /// Sets the extension used for newly stored images. Must be a
    /// non-empty ASCII alphanumeric string.
    pub fn with_image_extension(mut self, ext: &str) -> Result<Self, StorageError> {
        let ext = ext.trim_start_matches('.');
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StorageError::MalformedRequest(format!(
                "invalid image extension '{}'",
                ext
            )));
        }
        self.image_extension = ext.to_ascii_lowercase();
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn image_extension(&self) -> &str {
        &self.image_extension
    }

    pub fn document_path(&self) -> PathBuf {
        self.root.join(DOCUMENT_FILE)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join(BACKUPS_DIR)
    }

    /// Filesystem path of an image reference.
    pub fn resolve(&self, reference: &ImageReference) -> PathBuf {
        reference
            .components()
            .fold(self.root.clone(), |path, component| path.join(component))
    }
}

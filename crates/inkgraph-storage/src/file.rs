//! File-backed implementation of [`DocumentStore`].
//!
//! Saves go to a temporary file in the document's directory which is then
//! renamed over the document, so readers see either the old or the new
//! content and never a partial write.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use inkgraph_core::GraphDocument;
use tempfile::NamedTempFile;

use crate::error::StorageError;
use crate::traits::DocumentStore;

/// Durable [`DocumentStore`] backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    path: PathBuf,
}

impl FileDocumentStore {
    /// Creates a store for the document at `path`. Nothing is read or
    /// created until the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileDocumentStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl DocumentStore for FileDocumentStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load_raw(&self) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(&self.path, e)),
        }
    }

    fn save(&mut self, document: &GraphDocument) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let dir = self.parent_dir();
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| StorageError::io(&dir, e))?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| StorageError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StorageError::io(&self.path, e.error))?;

        tracing::debug!(
            path = %self.path.display(),
            nodes = document.node_count(),
            bytes = bytes.len(),
            "saved document"
        );
        Ok(())
    }

    fn exists(&self) -> Result<bool, StorageError> {
        self.path
            .try_exists()
            .map_err(|e| StorageError::io(&self.path, e))
    }
}

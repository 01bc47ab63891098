//! Storage error types for inkgraph-storage.
//!
//! [`StorageError`] covers every failure a core operation can report:
//! missing document or node, undecodable input, a durable document that no
//! longer parses, and disk I/O failures. Duplicate uploads are not errors;
//! they are an [`UploadOutcome`](crate::UploadOutcome).

use std::path::{Path, PathBuf};

use inkgraph_core::{CoreError, NodeId};
use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A disk read or write failed.
    #[error("I/O failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The durable document does not exist.
    #[error("document not found: {location}")]
    DocumentNotFound { location: String },

    /// The durable document exists but no longer parses.
    #[error("corrupt document at {location}: {reason}")]
    CorruptDocument { location: String, reason: String },

    /// The document exists but has no node with this identifier.
    #[error("node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// A replacement document payload could not be decoded.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A request argument (such as an image reference) was rejected.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// A document could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<CoreError> for StorageError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NodeNotFound { id } => StorageError::NodeNotFound { id },
            CoreError::InvalidReference { .. } => StorageError::MalformedRequest(err.to_string()),
            CoreError::MalformedDocument(source) => {
                StorageError::MalformedPayload(source.to_string())
            }
        }
    }
}

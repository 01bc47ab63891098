//! Core error types for inkgraph-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of the document model itself.

use crate::id::NodeId;
use thiserror::Error;

/// Core errors produced by the inkgraph-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No node with the given identifier exists in the document.
    #[error("node not found: NodeId({id})", id = id.0)]
    NodeNotFound { id: NodeId },

    /// A string could not be accepted as an image reference.
    #[error("invalid image reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    /// A payload could not be decoded into the document shape.
    #[error("malformed document: {0}")]
    MalformedDocument(#[from] serde_json::Error),
}

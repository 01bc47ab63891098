//! The [`DocumentStore`] trait defining the storage contract for the graph
//! document.
//!
//! A store owns exactly one durable document and is the only code that
//! reads or writes it. Callers load a [`GraphDocument`] value, change it,
//! and hand it back to [`DocumentStore::save`]; no copy is cached between
//! operations.
//!
//! Backends ([`FileDocumentStore`](crate::FileDocumentStore),
//! [`InMemoryDocumentStore`](crate::InMemoryDocumentStore)) are fully
//! swappable. The trait is synchronous: every operation runs to completion
//! on the caller's thread.

use inkgraph_core::GraphDocument;

use crate::error::StorageError;

/// The storage contract for the graph document.
pub trait DocumentStore {
    /// Human-readable location of the durable document, used in errors.
    fn location(&self) -> String;

    /// Reads the durable document's exact bytes, or `None` if it does not
    /// exist.
    fn load_raw(&self) -> Result<Option<Vec<u8>>, StorageError>;

    /// Serializes `document` and replaces the durable document with it.
    ///
    /// This is the single write path for the document.
    fn save(&mut self, document: &GraphDocument) -> Result<(), StorageError>;

    /// Returns true if a durable document exists.
    fn exists(&self) -> Result<bool, StorageError> {
        Ok(self.load_raw()?.is_some())
    }

    /// Loads and decodes the durable document.
    ///
    /// Fails with [`StorageError::DocumentNotFound`] if there is none and
    /// [`StorageError::CorruptDocument`] if it does not decode.
    fn load(&self) -> Result<GraphDocument, StorageError> {
        let raw = self
            .load_raw()?
            .ok_or_else(|| StorageError::DocumentNotFound {
                location: self.location(),
            })?;
        GraphDocument::from_slice(&raw).map_err(|e| StorageError::CorruptDocument {
            location: self.location(),
            reason: e.to_string(),
        })
    }

    /// Like [`DocumentStore::load`], but an absent document loads as an
    /// empty one.
    fn load_or_empty(&self) -> Result<GraphDocument, StorageError> {
        match self.load() {
            Err(StorageError::DocumentNotFound { .. }) => Ok(GraphDocument::new()),
            other => other,
        }
    }
}

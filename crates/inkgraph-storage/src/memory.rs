//! In-memory implementation of [`DocumentStore`].
//!
//! [`InMemoryDocumentStore`] keeps the serialized document bytes exactly as
//! the file backend would write them, so raw reads, backups and corrupt
//! content behave identically. Used by tests and ephemeral sessions.

use inkgraph_core::GraphDocument;

use crate::error::StorageError;
use crate::traits::DocumentStore;

/// In-memory implementation of [`DocumentStore`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryDocumentStore {
    raw: Option<Vec<u8>>,
}

impl InMemoryDocumentStore {
    /// Creates a store with no document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose durable document is `raw`, verbatim.
    pub fn with_raw(raw: impl Into<Vec<u8>>) -> Self {
        InMemoryDocumentStore {
            raw: Some(raw.into()),
        }
    }

    /// Creates a store holding `document` in its saved form.
    pub fn with_document(document: &GraphDocument) -> Result<Self, StorageError> {
        let mut store = Self::new();
        store.save(document)?;
        Ok(store)
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn location(&self) -> String {
        "<memory>".to_string()
    }

    fn load_raw(&self) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.raw.clone())
    }

    fn save(&mut self, document: &GraphDocument) -> Result<(), StorageError> {
        self.raw = Some(serde_json::to_vec_pretty(document)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkgraph_core::{Node, NodeId};

    #[test]
    fn test_empty_store() {
        let store = InMemoryDocumentStore::new();
        assert!(!store.exists().unwrap());
        match store.load() {
            Err(StorageError::DocumentNotFound { location }) => assert_eq!(location, "<memory>"),
            other => panic!("expected DocumentNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_save_then_load() {
        let mut store = InMemoryDocumentStore::new();
        let mut doc = GraphDocument::new();
        doc.nodes.push(Node::new(NodeId(3), "C"));
        store.save(&doc).unwrap();
        assert_eq!(store.load().unwrap(), doc);
    }

    #[test]
    fn test_raw_bytes_kept_verbatim() {
        let raw = br#"{"nodes":[],"links":[]}"#.to_vec();
        let store = InMemoryDocumentStore::with_raw(raw.clone());
        assert_eq!(store.load_raw().unwrap(), Some(raw));
        assert_eq!(store.load().unwrap(), GraphDocument::new());
    }

    #[test]
    fn test_corrupt_raw() {
        let store = InMemoryDocumentStore::with_raw("[1, 2");
        assert!(matches!(
            store.load(),
            Err(StorageError::CorruptDocument { .. })
        ));
    }
}

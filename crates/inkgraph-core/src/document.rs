//! The graph document: nodes, links and anything else the editor stores.
//!
//! Only `nodes[].id`, `nodes[].name` and `nodes[].images` are interpreted
//! here. Every other field (on nodes or at the top level) is carried in an
//! order-preserving map and written back untouched, and links are opaque
//! JSON values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::id::NodeId;
use crate::reference::ImageReference;

/// A link between nodes. Its shape belongs to the editor.
pub type Link = Value;

/// A graph vertex (an author or other entity) and its attached images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Externally assigned identifier, never changed here.
    pub id: NodeId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Image references in display order. Kept as raw strings: entries are
    /// validated when they are used, not when the document is loaded.
    #[serde(default)]
    pub images: Vec<String>,
    /// Fields this crate does not manage.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// Creates a node with no images and no extra fields.
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Node {
            id,
            name: name.into(),
            images: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Returns true if `reference` is listed on this node.
    pub fn has_image(&self, reference: &str) -> bool {
        self.images.iter().any(|image| image == reference)
    }

    /// Appends a reference to the end of the image list.
    pub fn push_image(&mut self, reference: ImageReference) {
        self.images.push(reference.into());
    }

    /// Removes the first occurrence of `reference`. Returns whether an
    /// entry was removed.
    pub fn remove_image(&mut self, reference: &str) -> bool {
        match self.images.iter().position(|image| image == reference) {
            Some(idx) => {
                self.images.remove(idx);
                true
            }
            None => false,
        }
    }
}

/// The full persisted graph state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Nodes in document order. Identifiers are unique.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Links, passed through unchanged.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Top-level fields this crate does not manage.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a document from its JSON serialization.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encodes the document the way it is stored on disk: pretty-printed
    /// with 2-space indentation and no trailing newline.
    pub fn to_pretty_vec(&self) -> Result<Vec<u8>, CoreError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Looks up a node by identifier. The first match wins.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Mutable variant of [`GraphDocument::node`].
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Like [`GraphDocument::node`] but reports a missing node as an error.
    pub fn find_node(&self, id: NodeId) -> Result<&Node, CoreError> {
        self.node(id).ok_or(CoreError::NodeNotFound { id })
    }

    /// Like [`GraphDocument::node_mut`] but reports a missing node as an error.
    pub fn find_node_mut(&mut self, id: NodeId) -> Result<&mut Node, CoreError> {
        self.node_mut(id).ok_or(CoreError::NodeNotFound { id })
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

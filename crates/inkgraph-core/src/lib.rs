//! Data model for inkgraph graph documents.
//!
//! A [`GraphDocument`] holds the editor's nodes (authors and other entities)
//! and the links between them. Nodes carry an ordered list of image
//! references; everything else in the document is passed through untouched.

pub mod document;
pub mod duplicates;
pub mod error;
pub mod id;
pub mod reference;

// Re-export commonly used types
pub use document::{GraphDocument, Link, Node};
pub use duplicates::DuplicateReport;
pub use error::CoreError;
pub use id::NodeId;
pub use reference::{ImageReference, IMAGES_DIR};

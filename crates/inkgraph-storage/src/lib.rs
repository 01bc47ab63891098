//! Persistence for inkgraph graph documents and their images.
//!
//! Provides the [`DocumentStore`] trait defining the storage contract for
//! the graph document, plus [`FileDocumentStore`] and
//! [`InMemoryDocumentStore`] as first-class backends, and the
//! [`AssetLibrary`] that composes them with image and backup storage.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`hash`]: blake3 content digests for duplicate detection
//! - [`layout`]: paths of the document, images and backups under a root
//! - [`traits`]: DocumentStore trait definition
//! - [`file`]: FileDocumentStore implementation
//! - [`memory`]: InMemoryDocumentStore implementation
//! - [`image_store`]: image asset storage
//! - [`backup`]: pre-overwrite document backups
//! - [`library`]: upload, delete and replace operations

pub mod backup;
pub mod error;
pub mod file;
pub mod hash;
pub mod image_store;
pub mod layout;
pub mod library;
pub mod memory;
pub mod traits;

// Re-export key types for ergonomic use.
pub use backup::BackupManager;
pub use error::StorageError;
pub use file::FileDocumentStore;
pub use hash::{digest, ContentDigest};
pub use image_store::ImageStore;
pub use layout::StorageLayout;
pub use library::{AssetLibrary, DeleteOutcome, ReplaceOutcome, UploadOutcome};
pub use memory::InMemoryDocumentStore;
pub use traits::DocumentStore;

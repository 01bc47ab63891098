//! Filesystem store for image assets.
//!
//! Assets live under the layout's images directory with node-scoped,
//! deterministic names (`<node>_<index>.<ext>`). An asset is written once
//! and never rewritten: allocation skips any slot that is listed on the
//! node or already present on disk, and writes refuse to replace an
//! existing file.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};

use inkgraph_core::{ImageReference, Node};

use crate::error::StorageError;
use crate::hash::{self, ContentDigest};
use crate::layout::StorageLayout;

/// Stores, hashes and removes image assets.
#[derive(Debug, Clone)]
pub struct ImageStore {
    layout: StorageLayout,
}

impl ImageStore {
    pub fn new(layout: StorageLayout) -> Self {
        ImageStore { layout }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// The node's current image references, in list order.
    pub fn stored_references_for(node: &Node) -> &[String] {
        &node.images
    }

    /// Hashes the asset at `reference`, or returns `None` if it is missing
    /// or is not a regular file.
    pub fn digest_of(
        &self,
        reference: &ImageReference,
    ) -> Result<Option<ContentDigest>, StorageError> {
        let path = self.layout.resolve(reference);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                tracing::warn!(reference = %reference, "image reference is not a regular file");
                return Ok(None);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(&path, e)),
        }
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(&path, e)),
        };
        hash::digest_reader(file)
            .map(Some)
            .map_err(|e| StorageError::io(&path, e))
    }

    /// Returns the first reference on `node` whose stored bytes hash to
    /// `digest`.
    ///
    /// Dangling references and entries that are not valid references are
    /// skipped.
    pub fn find_duplicate(
        &self,
        node: &Node,
        digest: &ContentDigest,
    ) -> Result<Option<ImageReference>, StorageError> {
        for raw in Self::stored_references_for(node) {
            let reference = match ImageReference::parse(raw) {
                Ok(reference) => reference,
                Err(err) => {
                    tracing::warn!(node = %node.id, %err, "skipping unusable image reference");
                    continue;
                }
            };
            match self.digest_of(&reference)? {
                Some(existing) if existing == *digest => return Ok(Some(reference)),
                Some(_) => {}
                None => {
                    tracing::debug!(node = %node.id, reference = %reference, "dangling image reference");
                }
            }
        }
        Ok(None)
    }

    /// Picks the reference for the next image of `node`.
    ///
    /// The index starts at the node's current image count and advances
    /// past any slot that is already listed or already exists on disk.
    pub fn allocate_reference(&self, node: &Node) -> Result<ImageReference, StorageError> {
        let mut index = node.images.len();
        loop {
            let reference =
                ImageReference::for_slot(node.id, index, self.layout.image_extension());
            let path = self.layout.resolve(&reference);
            let on_disk = path.try_exists().map_err(|e| StorageError::io(&path, e))?;
            if !on_disk && !node.has_image(reference.as_str()) {
                return Ok(reference);
            }
            index += 1;
        }
    }

    /// Writes `bytes` as a new asset at `reference`, creating the images
    /// directory if needed. Fails if a file already exists there.
    pub fn write(&self, reference: &ImageReference, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.layout.resolve(reference);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| StorageError::io(&path, e))?;
        if let Err(e) = file.write_all(bytes).and_then(|_| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(StorageError::io(&path, e));
        }

        tracing::debug!(reference = %reference, bytes = bytes.len(), "stored image");
        Ok(())
    }

    /// Removes the asset at `reference`. A missing file is not an error.
    ///
    /// Returns whether a file was actually removed.
    pub fn delete(&self, reference: &ImageReference) -> Result<bool, StorageError> {
        let path = self.layout.resolve(reference);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(reference = %reference, "removed image");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }
}

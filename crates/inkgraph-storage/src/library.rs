//! The asset library: upload, delete and replace operations over a
//! document store, an image store and a backup manager.
//!
//! Every operation is a read-modify-write of the whole document: load it,
//! change the value, save it back. Nothing here locks; callers that can
//! run operations concurrently must serialize them (see the server's
//! `AppState`).
//!
//! # Ordering guarantees
//!
//! - **Upload**: the image file is written before its reference is added
//!   to the document, and the document is saved last. A failed write
//!   leaves the document untouched.
//! - **Delete**: the document is updated before the file is removed; both
//!   steps tolerate the target state already holding.
//! - **Replace**: the previous document bytes are backed up before the new
//!   document is saved.

use std::path::PathBuf;

use inkgraph_core::{duplicates, DuplicateReport, GraphDocument, ImageReference, NodeId};

use crate::backup::BackupManager;
use crate::error::StorageError;
use crate::hash;
use crate::image_store::ImageStore;
use crate::layout::StorageLayout;
use crate::traits::DocumentStore;

/// Result of an upload that was not rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The bytes were stored under a new reference.
    Stored { reference: ImageReference },
    /// The node already has an image with identical content; nothing was
    /// written.
    Duplicate { existing: ImageReference },
}

/// What a delete actually changed. A delete succeeds either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    /// The node exists in the document.
    pub node_found: bool,
    /// The reference was listed on the node and has been removed.
    pub removed_from_node: bool,
    /// A file existed and has been removed.
    pub file_removed: bool,
}

/// Result of a full document replacement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplaceOutcome {
    /// Backup of the previous document, if there was one.
    pub backup: Option<PathBuf>,
}

/// Coordinates the document, image and backup stores.
pub struct AssetLibrary<D: DocumentStore> {
    documents: D,
    images: ImageStore,
    backups: BackupManager,
}

impl<D: DocumentStore> AssetLibrary<D> {
    /// Creates a library storing images and backups under `layout`.
    pub fn new(documents: D, layout: StorageLayout) -> Self {
        let backups = BackupManager::new(layout.backups_dir());
        AssetLibrary {
            documents,
            images: ImageStore::new(layout),
            backups,
        }
    }

    /// Replaces the backup manager (e.g. to pin its clock).
    pub fn with_backups(mut self, backups: BackupManager) -> Self {
        self.backups = backups;
        self
    }

    pub fn documents(&self) -> &D {
        &self.documents
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Loads the current document.
    pub fn document(&self) -> Result<GraphDocument, StorageError> {
        self.documents.load()
    }

    /// The current document's exact bytes, if it exists.
    pub fn raw_document(&self) -> Result<Option<Vec<u8>>, StorageError> {
        self.documents.load_raw()
    }

    /// Attaches `bytes` as a new image of node `node_id`.
    ///
    /// Fails with [`StorageError::NodeNotFound`] (writing nothing) if the
    /// node does not exist; an absent document counts as having no nodes.
    /// Returns [`UploadOutcome::Duplicate`] if any of the node's existing
    /// images has identical content.
    pub fn upload_image(
        &mut self,
        node_id: NodeId,
        bytes: &[u8],
    ) -> Result<UploadOutcome, StorageError> {
        let mut document = self.documents.load_or_empty()?;
        let node = document.find_node(node_id)?;

        let incoming = hash::digest(bytes);
        if let Some(existing) = self.images.find_duplicate(node, &incoming)? {
            tracing::info!(node = %node_id, existing = %existing, "duplicate upload rejected");
            return Ok(UploadOutcome::Duplicate { existing });
        }

        let reference = self.images.allocate_reference(node)?;
        self.images.write(&reference, bytes)?;
        document.find_node_mut(node_id)?.push_image(reference.clone());

        if let Err(err) = self.documents.save(&document) {
            // the reference never became durable, so the file is an orphan
            if let Err(cleanup) = self.images.delete(&reference) {
                tracing::warn!(reference = %reference, %cleanup, "failed to remove orphaned image");
            }
            return Err(err);
        }

        tracing::info!(node = %node_id, reference = %reference, bytes = bytes.len(), "stored image");
        Ok(UploadOutcome::Stored { reference })
    }

    /// Detaches `reference` from node `node_id` and removes its file.
    ///
    /// Idempotent: an unknown node, an unlisted reference, a missing file
    /// or a missing document all still succeed. The file is removed even
    /// if the node does not exist. Fails with
    /// [`StorageError::MalformedRequest`] if `reference` is not a valid
    /// image reference.
    pub fn delete_image(
        &mut self,
        node_id: NodeId,
        reference: &str,
    ) -> Result<DeleteOutcome, StorageError> {
        let reference = ImageReference::parse(reference)?;
        let mut outcome = DeleteOutcome::default();

        let mut document = self.documents.load_or_empty()?;
        match document.node_mut(node_id) {
            Some(node) => {
                outcome.node_found = true;
                outcome.removed_from_node = node.remove_image(reference.as_str());
            }
            None => {
                tracing::warn!(node = %node_id, reference = %reference, "delete for unknown node, removing file only");
            }
        }
        if outcome.removed_from_node {
            self.documents.save(&document)?;
        }

        outcome.file_removed = self.images.delete(&reference)?;
        tracing::info!(
            node = %node_id,
            reference = %reference,
            listed = outcome.removed_from_node,
            file = outcome.file_removed,
            "deleted image"
        );
        Ok(outcome)
    }

    /// Replaces the whole document with `payload`, backing up the previous
    /// document's exact bytes first.
    ///
    /// Fails with [`StorageError::MalformedPayload`] before touching
    /// anything if `payload` does not decode. If the final save fails the
    /// backup has already been written and the old document is still in
    /// place; retrying is safe.
    pub fn replace_document(&mut self, payload: &[u8]) -> Result<ReplaceOutcome, StorageError> {
        let document = GraphDocument::from_slice(payload)?;

        let current = self.documents.load_raw()?;
        let backup = self.backups.backup_before_overwrite(current.as_deref())?;
        self.documents.save(&document)?;

        tracing::info!(
            nodes = document.node_count(),
            links = document.link_count(),
            backed_up = backup.is_some(),
            "replaced document"
        );
        Ok(ReplaceOutcome { backup })
    }

    /// Reports duplicate links and nodes in the current document.
    pub fn audit_duplicates(&self) -> Result<DuplicateReport, StorageError> {
        Ok(duplicates::audit(&self.documents.load_or_empty()?))
    }

    /// Removes duplicate links and saves the document if any were found.
    pub fn remove_duplicate_links(&mut self) -> Result<usize, StorageError> {
        let mut document = self.documents.load()?;
        let removed = duplicates::remove_duplicate_links(&mut document);
        if removed > 0 {
            self.documents.save(&document)?;
            tracing::info!(removed, "removed duplicate links");
        }
        Ok(removed)
    }

    /// Merges same-named nodes and saves the document if any were found.
    pub fn merge_duplicate_nodes(&mut self) -> Result<usize, StorageError> {
        let mut document = self.documents.load()?;
        let merged = duplicates::merge_duplicate_nodes(&mut document);
        if merged > 0 {
            self.documents.save(&document)?;
            tracing::info!(merged, "merged duplicate nodes");
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use chrono::{NaiveDate, NaiveDateTime};
    use inkgraph_core::Node;
    use proptest::prelude::*;
    use serde_json::json;

    use crate::file::FileDocumentStore;
    use crate::memory::InMemoryDocumentStore;

    fn fixed() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap()
    }

    fn one_node_doc() -> GraphDocument {
        GraphDocument {
            nodes: vec![Node::new(NodeId(1), "A")],
            ..GraphDocument::default()
        }
    }

    fn library(
        dir: &tempfile::TempDir,
        doc: Option<&GraphDocument>,
    ) -> AssetLibrary<InMemoryDocumentStore> {
        let store = match doc {
            Some(doc) => InMemoryDocumentStore::with_document(doc).unwrap(),
            None => InMemoryDocumentStore::new(),
        };
        let layout = StorageLayout::new(dir.path());
        let backups = BackupManager::new(layout.backups_dir()).with_clock(fixed);
        AssetLibrary::new(store, layout).with_backups(backups)
    }

    fn stored(outcome: UploadOutcome) -> ImageReference {
        match outcome {
            UploadOutcome::Stored { reference } => reference,
            other => panic!("expected Stored, got: {:?}", other),
        }
    }

    #[test]
    fn test_upload_delete_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let mut lib = library(&dir, Some(&one_node_doc()));

        let r0 = stored(lib.upload_image(NodeId(1), b"B1").unwrap());
        assert_eq!(r0.as_str(), "images/1_0.png");
        assert_eq!(lib.document().unwrap().nodes[0].images, vec!["images/1_0.png"]);

        assert_eq!(
            lib.upload_image(NodeId(1), b"B1").unwrap(),
            UploadOutcome::Duplicate { existing: r0.clone() }
        );
        assert_eq!(lib.document().unwrap().nodes[0].images.len(), 1);

        let r1 = stored(lib.upload_image(NodeId(1), b"B2").unwrap());
        assert_eq!(r1.as_str(), "images/1_1.png");

        let outcome = lib.delete_image(NodeId(1), "images/1_0.png").unwrap();
        assert!(outcome.node_found && outcome.removed_from_node && outcome.file_removed);
        assert_eq!(lib.document().unwrap().nodes[0].images, vec!["images/1_1.png"]);
        assert!(!dir.path().join("images/1_0.png").exists());
        assert_eq!(fs::read(dir.path().join("images/1_1.png")).unwrap(), b"B2");
    }

    #[test]
    fn test_third_distinct_upload_gets_index_two() {
        let dir = tempfile::tempdir().unwrap();
        let mut lib = library(&dir, Some(&one_node_doc()));
        stored(lib.upload_image(NodeId(1), b"one").unwrap());
        stored(lib.upload_image(NodeId(1), b"two").unwrap());
        let third = stored(lib.upload_image(NodeId(1), b"three").unwrap());
        assert!(third.as_str().ends_with("_2.png"));
    }

    #[test]
    fn test_upload_after_delete_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut lib = library(&dir, Some(&one_node_doc()));
        stored(lib.upload_image(NodeId(1), b"B1").unwrap());
        stored(lib.upload_image(NodeId(1), b"B2").unwrap());
        lib.delete_image(NodeId(1), "images/1_0.png").unwrap();

        let next = stored(lib.upload_image(NodeId(1), b"B3").unwrap());
        assert_eq!(next.as_str(), "images/1_2.png");
        assert_eq!(fs::read(dir.path().join("images/1_1.png")).unwrap(), b"B2");
        assert_eq!(
            lib.document().unwrap().nodes[0].images,
            vec!["images/1_1.png", "images/1_2.png"]
        );
    }

    #[test]
    fn test_upload_unknown_node_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut lib = library(&dir, Some(&one_node_doc()));
        let before = lib.raw_document().unwrap();

        assert!(matches!(
            lib.upload_image(NodeId(99), b"bytes"),
            Err(StorageError::NodeNotFound { id: NodeId(99) })
        ));
        assert!(!dir.path().join("images").exists());
        assert_eq!(lib.raw_document().unwrap(), before);
    }

    #[test]
    fn test_upload_without_document_is_node_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut lib = library(&dir, None);
        assert!(matches!(
            lib.upload_image(NodeId(1), b"bytes"),
            Err(StorageError::NodeNotFound { .. })
        ));
        assert!(lib.raw_document().unwrap().is_none());
    }

    #[test]
    fn test_upload_skips_dangling_reference_when_checking_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = one_node_doc();
        doc.nodes[0].images = vec!["images/1_0.png".into()];
        let mut lib = library(&dir, Some(&doc));

        let reference = stored(lib.upload_image(NodeId(1), b"fresh").unwrap());
        assert_eq!(reference.as_str(), "images/1_1.png");
    }

    #[test]
    fn test_delete_unlisted_reference_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut lib = library(&dir, Some(&one_node_doc()));
        stored(lib.upload_image(NodeId(1), b"B1").unwrap());
        let before = lib.raw_document().unwrap();

        let outcome = lib.delete_image(NodeId(1), "images/1_5.png").unwrap();
        assert!(outcome.node_found);
        assert!(!outcome.removed_from_node);
        assert!(!outcome.file_removed);
        assert_eq!(lib.raw_document().unwrap(), before);
    }

    #[test]
    fn test_delete_listed_reference_with_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = one_node_doc();
        doc.nodes[0].images = vec!["images/1_0.png".into(), "images/1_1.png".into()];
        let mut lib = library(&dir, Some(&doc));

        let outcome = lib.delete_image(NodeId(1), "images/1_0.png").unwrap();
        assert!(outcome.removed_from_node);
        assert!(!outcome.file_removed);
        assert_eq!(lib.document().unwrap().nodes[0].images, vec!["images/1_1.png"]);
    }

    #[test]
    fn test_delete_unknown_node_still_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut lib = library(&dir, Some(&one_node_doc()));
        stored(lib.upload_image(NodeId(1), b"B1").unwrap());

        let outcome = lib.delete_image(NodeId(42), "images/1_0.png").unwrap();
        assert!(!outcome.node_found);
        assert!(outcome.file_removed);
        // node 1 still lists the (now dangling) reference
        assert_eq!(lib.document().unwrap().nodes[0].images, vec!["images/1_0.png"]);
    }

    #[test]
    fn test_delete_rejects_escaping_reference() {
        let dir = tempfile::tempdir().unwrap();
        let mut lib = library(&dir, Some(&one_node_doc()));
        assert!(matches!(
            lib.delete_image(NodeId(1), "images/../data.json"),
            Err(StorageError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_replace_backs_up_exact_prior_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let prior = b"{\"nodes\": [{\"id\": 1, \"name\": \"A\"}],\n\"links\": []}".to_vec();
        let layout = StorageLayout::new(dir.path());
        let mut lib = AssetLibrary::new(InMemoryDocumentStore::with_raw(prior.clone()), layout.clone())
            .with_backups(BackupManager::new(layout.backups_dir()).with_clock(fixed));

        let payload = json!({ "nodes": [{ "id": 2, "name": "B" }], "links": [] });
        let outcome = lib
            .replace_document(serde_json::to_vec(&payload).unwrap().as_slice())
            .unwrap();

        let backup = outcome.backup.unwrap();
        assert_eq!(backup, dir.path().join("backups/data_20250102_030405.json"));
        assert_eq!(fs::read(&backup).unwrap(), prior);
        assert_eq!(lib.backups().list().unwrap().len(), 1);
        assert_eq!(lib.document().unwrap().nodes[0].id, NodeId(2));
    }

    #[test]
    fn test_replace_without_prior_document_takes_no_backup() {
        let dir = tempfile::tempdir().unwrap();
        let mut lib = library(&dir, None);
        let outcome = lib.replace_document(br#"{"nodes": [], "links": []}"#).unwrap();
        assert!(outcome.backup.is_none());
        assert!(lib.backups().list().unwrap().is_empty());
        assert!(lib.documents().exists().unwrap());
    }

    #[test]
    fn test_replace_malformed_payload_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut lib = library(&dir, Some(&one_node_doc()));
        let before = lib.raw_document().unwrap();

        let payloads: [&[u8]; 3] = [b"{not json", br#"{"nodes": {"id": 1}}"#, b"[]"];
        for payload in payloads {
            assert!(matches!(
                lib.replace_document(payload),
                Err(StorageError::MalformedPayload(_))
            ));
        }
        assert!(lib.backups().list().unwrap().is_empty());
        assert_eq!(lib.raw_document().unwrap(), before);
    }

    #[test]
    fn test_corrupt_document_blocks_upload() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path());
        let mut lib = AssetLibrary::new(InMemoryDocumentStore::with_raw("{"), layout);
        assert!(matches!(
            lib.upload_image(NodeId(1), b"x"),
            Err(StorageError::CorruptDocument { .. })
        ));
    }

    #[test]
    fn test_file_backed_roundtrip_keeps_unmanaged_fields() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path());
        fs::write(
            layout.document_path(),
            br#"{"nodes": [{"id": 1, "name": "A", "birth_year": 1899}], "links": [{"id1": 1, "id2": 1, "label": "self"}]}"#,
        )
        .unwrap();
        let mut lib = AssetLibrary::new(FileDocumentStore::new(layout.document_path()), layout);

        stored(lib.upload_image(NodeId(1), b"portrait").unwrap());
        let doc = lib.document().unwrap();
        assert_eq!(doc.nodes[0].extra["birth_year"], json!(1899));
        assert_eq!(doc.links[0]["label"], json!("self"));
        assert_eq!(doc.nodes[0].images, vec!["images/1_0.png"]);
    }

    #[test]
    fn test_cleanup_operations_persist() {
        let dir = tempfile::tempdir().unwrap();
        let doc = GraphDocument {
            nodes: vec![Node::new(NodeId(1), "A"), Node::new(NodeId(2), "a")],
            links: vec![
                json!({ "id1": 1, "id2": 2, "label": "x" }),
                json!({ "id1": 2, "id2": 1, "label": "X" }),
            ],
            ..GraphDocument::default()
        };
        let mut lib = library(&dir, Some(&doc));

        let report = lib.audit_duplicates().unwrap();
        assert_eq!(report.duplicate_links, vec![1]);
        assert_eq!(report.duplicate_nodes, vec![vec![NodeId(1), NodeId(2)]]);

        assert_eq!(lib.remove_duplicate_links().unwrap(), 1);
        assert_eq!(lib.merge_duplicate_nodes().unwrap(), 1);
        let after = lib.document().unwrap();
        assert_eq!(after.node_count(), 1);
        assert_eq!(after.links, vec![json!({ "id1": 1, "id2": 1, "label": "x" })]);
        assert!(lib.audit_duplicates().unwrap().is_clean());
    }

    #[test]
    fn test_merge_first_also_drops_repeated_links() {
        let dir = tempfile::tempdir().unwrap();
        let doc = GraphDocument {
            nodes: vec![
                Node::new(NodeId(1), "A"),
                Node::new(NodeId(2), "a"),
                Node::new(NodeId(3), "B"),
            ],
            links: vec![
                json!({ "id1": 1, "id2": 3, "label": "x" }),
                json!({ "id1": 2, "id2": 3, "label": "x" }),
            ],
            ..GraphDocument::default()
        };
        let mut lib = library(&dir, Some(&doc));

        assert_eq!(lib.merge_duplicate_nodes().unwrap(), 1);
        let after = lib.document().unwrap();
        assert_eq!(after.links, vec![json!({ "id1": 1, "id2": 3, "label": "x" })]);
        assert!(lib.audit_duplicates().unwrap().is_clean());
    }

    #[test]
    fn test_upload_ignores_reference_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("images/sub")).unwrap();
        let mut node = Node::new(NodeId(1), "A");
        node.images = vec!["images/sub".into()];
        let doc = GraphDocument {
            nodes: vec![node],
            ..GraphDocument::default()
        };
        let mut lib = library(&dir, Some(&doc));

        let reference = stored(lib.upload_image(NodeId(1), b"B1").unwrap());
        assert_eq!(reference.as_str(), "images/1_1.png");
        assert_eq!(
            lib.document().unwrap().nodes[0].images,
            vec!["images/sub", "images/1_1.png"]
        );
    }

    proptest! {
        #[test]
        fn prop_upload_to_unknown_node_fails_for_any_bytes(
            bytes in proptest::collection::vec(any::<u8>(), 0..512),
            id in 2i64..1000,
        ) {
            let dir = tempfile::tempdir().unwrap();
            let mut lib = library(&dir, Some(&one_node_doc()));
            let before = lib.raw_document().unwrap();

            let result = lib.upload_image(NodeId(id), &bytes);
            prop_assert!(
                matches!(result, Err(StorageError::NodeNotFound { id: missing }) if missing == NodeId(id)),
                "unexpected result: {:?}",
                result
            );
            prop_assert!(!dir.path().join("images").exists());
            prop_assert_eq!(lib.raw_document().unwrap(), before);
        }
    }
}

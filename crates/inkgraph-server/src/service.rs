//! AssetService: the single coordinator between HTTP handlers and the
//! storage crate.
//!
//! All business logic flows through [`AssetLibrary`]; this layer only turns
//! its outcomes into response types and its errors into [`ApiError`]s.

use inkgraph_core::NodeId;
use inkgraph_storage::layout::BACKUPS_DIR;
use inkgraph_storage::{AssetLibrary, FileDocumentStore, StorageLayout, UploadOutcome};

use crate::error::ApiError;
use crate::schema::document::{BackupListResponse, SaveDocumentResponse};
use crate::schema::duplicates::{CleanupResponse, DuplicateAuditResponse};
use crate::schema::images::{DeleteImageRequest, DeleteImageResponse, UploadImageResponse};

/// The service behind every endpoint, owning the file-backed library of
/// one data root.
pub struct AssetService {
    library: AssetLibrary<FileDocumentStore>,
}

impl AssetService {
    /// Creates a service for the data root described by `layout`.
    pub fn new(layout: StorageLayout) -> Self {
        let documents = FileDocumentStore::new(layout.document_path());
        AssetService {
            library: AssetLibrary::new(documents, layout),
        }
    }

    /// Stores `bytes` as a new image of `node_id`, unless it duplicates one
    /// of the node's images.
    pub fn upload_image(
        &mut self,
        node_id: NodeId,
        bytes: &[u8],
    ) -> Result<UploadImageResponse, ApiError> {
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("image is empty".to_string()));
        }
        let response = match self.library.upload_image(node_id, bytes)? {
            UploadOutcome::Stored { reference } => UploadImageResponse::Stored {
                filename: reference.file_name().to_string(),
                reference: reference.into(),
            },
            UploadOutcome::Duplicate { existing } => UploadImageResponse::Duplicate {
                existing: existing.into(),
            },
        };
        Ok(response)
    }

    /// Detaches an image from its node and removes the file.
    pub fn delete_image(
        &mut self,
        req: &DeleteImageRequest,
    ) -> Result<DeleteImageResponse, ApiError> {
        let outcome = self.library.delete_image(req.node_id, &req.image)?;
        Ok(DeleteImageResponse {
            success: true,
            node_found: outcome.node_found,
            removed_from_node: outcome.removed_from_node,
            file_removed: outcome.file_removed,
        })
    }

    /// Replaces the document with `payload`, backing up the previous one.
    pub fn save_document(&mut self, payload: &[u8]) -> Result<SaveDocumentResponse, ApiError> {
        let outcome = self.library.replace_document(payload)?;
        let backup = outcome.backup.as_deref().and_then(|path| {
            path.file_name()
                .map(|name| format!("{}/{}", BACKUPS_DIR, name.to_string_lossy()))
        });
        Ok(SaveDocumentResponse {
            success: true,
            backup,
        })
    }

    /// The durable document's exact bytes.
    pub fn raw_document(&self) -> Result<Vec<u8>, ApiError> {
        self.library
            .raw_document()?
            .ok_or_else(|| ApiError::NotFound("no document has been saved yet".to_string()))
    }

    /// Names of existing backups, oldest first.
    pub fn list_backups(&self) -> Result<BackupListResponse, ApiError> {
        Ok(BackupListResponse {
            backups: self.library.backups().list()?,
        })
    }

    /// Reports duplicate links and nodes.
    pub fn audit_duplicates(&self) -> Result<DuplicateAuditResponse, ApiError> {
        Ok(self.library.audit_duplicates()?.into())
    }

    /// Removes duplicate links.
    pub fn remove_duplicate_links(&mut self) -> Result<CleanupResponse, ApiError> {
        let removed = self.library.remove_duplicate_links()?;
        Ok(CleanupResponse {
            success: true,
            removed,
        })
    }

    /// Merges same-named nodes.
    pub fn merge_duplicate_nodes(&mut self) -> Result<CleanupResponse, ApiError> {
        let removed = self.library.merge_duplicate_nodes()?;
        Ok(CleanupResponse {
            success: true,
            removed,
        })
    }
}

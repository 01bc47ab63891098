//! Document replacement and backup listing types.

use serde::Serialize;

/// Response from replacing the whole document.
#[derive(Debug, Clone, Serialize)]
pub struct SaveDocumentResponse {
    pub success: bool,
    /// Backup of the previous document relative to the data root, e.g.
    /// `backups/data_20240101_120000.json`; absent if there was none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
}

/// Existing backups, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct BackupListResponse {
    pub backups: Vec<String>,
}

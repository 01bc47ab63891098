//! Image upload and delete request/response types.

use inkgraph_core::NodeId;
use serde::{Deserialize, Serialize};

/// Response from an upload. A duplicate is a successful outcome, not an
/// error: nothing was stored and the client keeps its current view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadImageResponse {
    /// The image was stored and attached to the node.
    Stored {
        /// Reference now listed on the node, e.g. `images/3_0.png`.
        reference: String,
        /// File name part of the reference.
        filename: String,
    },
    /// The node already has an image with identical content.
    Duplicate {
        /// The existing reference with the same content.
        existing: String,
    },
}

/// Request to detach an image from a node and remove its file.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteImageRequest {
    /// Node the image belongs to.
    pub node_id: NodeId,
    /// Image reference as listed on the node.
    pub image: String,
}

/// Response from a delete. Always successful unless the request was
/// malformed; the flags report what was actually changed.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteImageResponse {
    pub success: bool,
    pub node_found: bool,
    pub removed_from_node: bool,
    pub file_removed: bool,
}

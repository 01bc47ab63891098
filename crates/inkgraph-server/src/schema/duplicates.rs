//! Duplicate audit and cleanup response types.

use inkgraph_core::{DuplicateReport, NodeId};
use serde::Serialize;

/// Result of a duplicate audit.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateAuditResponse {
    /// True when there is nothing to clean.
    pub clean: bool,
    /// Indices of links repeating an earlier link.
    pub duplicate_links: Vec<usize>,
    /// Groups of same-named node ids; the first id is kept on merge.
    pub duplicate_nodes: Vec<Vec<NodeId>>,
}

impl From<DuplicateReport> for DuplicateAuditResponse {
    fn from(report: DuplicateReport) -> Self {
        DuplicateAuditResponse {
            clean: report.is_clean(),
            duplicate_links: report.duplicate_links,
            duplicate_nodes: report.duplicate_nodes,
        }
    }
}

/// Result of a cleanup pass.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    pub success: bool,
    /// Number of links or nodes removed.
    pub removed: usize,
}

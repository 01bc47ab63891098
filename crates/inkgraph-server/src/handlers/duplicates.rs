//! Duplicate audit and cleanup handlers.

use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::schema::duplicates::{CleanupResponse, DuplicateAuditResponse};
use crate::state::AppState;

/// `GET /duplicates`
pub async fn audit(
    State(state): State<AppState>,
) -> Result<Json<DuplicateAuditResponse>, ApiError> {
    let service = state.service.lock().await;
    Ok(Json(service.audit_duplicates()?))
}

/// `POST /duplicates/links/remove`
pub async fn remove_links(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let mut service = state.service.lock().await;
    Ok(Json(service.remove_duplicate_links()?))
}

/// `POST /duplicates/nodes/merge`
pub async fn merge_nodes(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let mut service = state.service.lock().await;
    Ok(Json(service.merge_duplicate_nodes()?))
}

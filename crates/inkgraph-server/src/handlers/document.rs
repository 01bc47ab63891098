//! Whole-document handlers (read, replace, backups).

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::ApiError;
use crate::schema::document::{BackupListResponse, SaveDocumentResponse};
use crate::state::AppState;

/// Returns the durable document exactly as stored.
///
/// `GET /data.json`
pub async fn get_document(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let service = state.service.lock().await;
    let raw = service.raw_document()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], raw))
}

/// Replaces the whole document, backing up the previous one.
///
/// `POST /save_data` (raw JSON body)
pub async fn save_document(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SaveDocumentResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let response = service.save_document(&body)?;
    Ok(Json(response))
}

/// Lists backup files.
///
/// `GET /backups`
pub async fn list_backups(
    State(state): State<AppState>,
) -> Result<Json<BackupListResponse>, ApiError> {
    let service = state.service.lock().await;
    Ok(Json(service.list_backups()?))
}

//! Image upload and delete handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;

use inkgraph_core::NodeId;

use crate::error::ApiError;
use crate::schema::images::{DeleteImageRequest, DeleteImageResponse, UploadImageResponse};
use crate::state::AppState;

/// Uploads an image for a node.
///
/// `POST /upload` (multipart: `image` file, `node_id` text)
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadImageResponse>, ApiError> {
    let mut node_id: Option<NodeId> = None;
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart payload: {}", e)))?
    {
        match field.name() {
            Some("node_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("invalid node_id field: {}", e)))?;
                let id = text
                    .parse::<NodeId>()
                    .map_err(|e| ApiError::BadRequest(format!("invalid node_id '{}': {}", text, e)))?;
                node_id = Some(id);
            }
            Some("image") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("invalid image field: {}", e)))?;
                image = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let node_id = node_id.ok_or_else(|| ApiError::BadRequest("missing node_id field".to_string()))?;
    let image = image.ok_or_else(|| ApiError::BadRequest("missing image field".to_string()))?;

    let mut service = state.service.lock().await;
    let response = service.upload_image(node_id, &image)?;
    Ok(Json(response))
}

/// Removes an image from a node and deletes its file.
///
/// `POST /delete_image`
pub async fn delete_image(
    State(state): State<AppState>,
    payload: Result<Json<DeleteImageRequest>, JsonRejection>,
) -> Result<Json<DeleteImageResponse>, ApiError> {
    let Json(req) = payload
        .map_err(|e| ApiError::BadRequest(format!("invalid delete request: {}", e.body_text())))?;
    let mut service = state.service.lock().await;
    let response = service.delete_image(&req)?;
    Ok(Json(response))
}

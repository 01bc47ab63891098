//! Router assembly for the inkgraph HTTP API.
//!
//! [`build_router`] wires all handler functions to their routes with
//! body-limit, CORS and tracing middleware layers.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// Image files are served straight from the images directory.
/// CORS is permissive (the editor may be opened from a file or another port).
/// TraceLayer provides request-level logging via tracing.
pub fn build_router(state: AppState) -> Router {
    let images = ServeDir::new(state.layout.images_dir());
    let body_limit = state.max_upload_bytes;

    Router::new()
        // Images
        .route("/upload", post(handlers::images::upload_image))
        .route("/delete_image", post(handlers::images::delete_image))
        .nest_service("/images", images)
        // Document
        .route("/data.json", get(handlers::document::get_document))
        .route("/save_data", post(handlers::document::save_document))
        .route("/backups", get(handlers::document::list_backups))
        // Duplicate cleanup
        .route("/duplicates", get(handlers::duplicates::audit))
        .route(
            "/duplicates/links/remove",
            post(handlers::duplicates::remove_links),
        )
        .route(
            "/duplicates/nodes/merge",
            post(handlers::duplicates::merge_nodes),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

//! HTTP server for the inkgraph graph editor.
//!
//! A thin transport layer over `inkgraph-storage`: it decodes uploads,
//! deletes and document saves into calls on [`service::AssetService`] and
//! encodes the outcomes as JSON. All requests are serialized through one
//! service lock (see [`state::AppState`]).

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod service;
pub mod state;

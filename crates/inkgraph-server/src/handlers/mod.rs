//! HTTP handler modules for the inkgraph API.
//!
//! Each sub-module implements thin handlers that decode requests, acquire the
//! service lock, delegate to [`AssetService`](crate::service::AssetService),
//! and return JSON responses. No business logic lives in handlers.

pub mod document;
pub mod duplicates;
pub mod images;

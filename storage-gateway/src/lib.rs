//! HTTP gateway for S3-compatible object storage
//!
//! Exposes `/upload`, `/list` and `/download` over a shared [`ObjectStore`].

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod storage;

use config::MAX_UPLOAD_BYTES;
use storage::ObjectStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

/// Build the gateway router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/upload",
            post(handlers::upload::upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/list", get(handlers::list::list_objects))
        .route("/download", get(handlers::download::download_object))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::gateway_cors()),
        )
        .with_state(state)
}

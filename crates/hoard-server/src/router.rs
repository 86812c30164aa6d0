use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use hoard_store::{BlobStore, NamingStrategy, Sha256Naming};
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler;

/// Shared handler state: the store and the naming strategy uploads use.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlobStore>,
    pub naming: Arc<dyn NamingStrategy>,
}

impl AppState {
    /// State naming uploads by their bare SHA-256 digest.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            naming: Arc::new(Sha256Naming::new()),
        }
    }
}

/// Build the axum router with all Hoard endpoints.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(handler::health_handler))
        .route("/files", post(handler::upload_handler))
        .route(
            "/files/:id",
            get(handler::download_handler).delete(handler::delete_handler),
        )
        .layer(DefaultBodyLimit::max(config.body_limit()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(config.request_timeout())),
        )
        .with_state(state)
}

use std::sync::Arc;

use hoard_store::{BlobStore, FileSystemStore, TracingHook};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, AppState};

/// Hoard blob server.
pub struct HoardServer {
    config: ServerConfig,
    state: AppState,
}

impl HoardServer {
    /// Validate `config` and open a filesystem store at `config.storage.root`.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let store = FileSystemStore::new(config.storage.clone())?.with_hook(Arc::new(TracingHook));
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Serve an arbitrary store.
    pub fn with_store(config: ServerConfig, store: Arc<dyn BlobStore>) -> Self {
        Self {
            config,
            state: AppState::new(store),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), &self.config)
    }

    /// Start serving requests until ctrl-c.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            root = %self.config.storage.root.display(),
            "hoard server listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoard_store::InMemoryBlobStore;

    #[test]
    fn server_construction() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::default();
        config.storage.root = dir.path().to_path_buf();
        let server = HoardServer::new(config).unwrap();
        assert_eq!(server.config().bind_addr, "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ServerConfig::default();
        config.storage.segment_len = 0;
        assert!(matches!(HoardServer::new(config), Err(ServerError::Config(_))));
    }

    #[test]
    fn router_builds() {
        let server = HoardServer::with_store(
            ServerConfig::default(),
            Arc::new(InMemoryBlobStore::new()),
        );
        let _router = server.router();
    }
}

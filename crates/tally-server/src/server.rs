use std::sync::Arc;

use tally_service::TransactionService;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// Transaction ledger HTTP server.
pub struct TallyServer {
    config: ServerConfig,
    service: Arc<TransactionService>,
}

impl TallyServer {
    /// Server over a fresh in-memory store.
    pub fn new(config: ServerConfig) -> Self {
        let service = Arc::new(TransactionService::in_memory(config.service.clone()));
        Self { config, service }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn service(&self) -> &Arc<TransactionService> {
        &self.service
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(
            Arc::clone(&self.service),
            self.config.paging.clone(),
        ))
    }

    /// Serve until ctrl-c.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            cache_enabled = self.config.service.cache_enabled,
            "tally server listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        tracing::info!("tally server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_construction() {
        let server = TallyServer::new(ServerConfig::default());
        assert_eq!(server.config().bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert!(server.service().config().cache_enabled);
    }

    #[test]
    fn service_config_flows_through() {
        let mut config = ServerConfig::default();
        config.service.cache_enabled = false;
        let server = TallyServer::new(config);
        assert!(!server.service().config().cache_enabled);
    }

    #[test]
    fn router_builds() {
        let server = TallyServer::new(ServerConfig::default());
        let _router = server.router();
    }
}

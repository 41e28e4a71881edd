//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Pick the registry client the merge pipeline talks to
//! - Bind server to listener and drain on shutdown

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    middleware,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::handlers;
use crate::http::middleware::record_metrics;
use crate::http::request::{request_span, MakeRequestUuid, X_REQUEST_ID};
use crate::http::submit;
use crate::peering::{HttpRegistryClient, MergeWorker, RegistryClient};
use crate::registry::{Registry, SnapshotCache};
use crate::render::TemplateRenderer;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub merge: MergeWorker,
    pub renderer: Arc<TemplateRenderer>,
}

/// HTTP server for the registry surface and the configuration generator.
pub struct HttpServer {
    config: ServerConfig,
    registry: Registry,
    renderer: Arc<TemplateRenderer>,
    registry_client: Option<Arc<dyn RegistryClient>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let cache = Arc::new(SnapshotCache::new(config.cache.directory.clone()));
        let renderer = Arc::new(TemplateRenderer::new(config.templates.directory.clone()));
        Self {
            config,
            registry: Registry::new(cache),
            renderer,
            registry_client: None,
        }
    }

    /// Use `client` for merge lookups instead of the configured one.
    pub fn with_registry_client(mut self, client: Arc<dyn RegistryClient>) -> Self {
        self.registry_client = Some(client);
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Registry client for a server bound at `local_addr`.
    ///
    /// Without `registry.url` the merge pipeline queries this process's own
    /// `/api` over loopback.
    fn registry_client(&self, local_addr: SocketAddr) -> std::io::Result<Arc<dyn RegistryClient>> {
        if let Some(client) = &self.registry_client {
            return Ok(client.clone());
        }

        let base_url = match &self.config.registry.url {
            Some(url) => url.clone(),
            None => format!("http://{}/api", loopback(local_addr)),
        };
        let client = HttpRegistryClient::new(base_url, self.config.registry.timeout())
            .map_err(std::io::Error::other)?;
        Ok(Arc::new(client))
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let submit_base = format!("/{}/{{vendor}}/{{style}}", config.api.submit_namespace);

        Router::new()
            .route("/api/ix", get(handlers::list_exchanges))
            .route("/api/ix/{id}", get(handlers::get_exchange))
            .route("/api/ixlan", get(handlers::list_lans))
            .route("/api/ixlan/{id}", get(handlers::get_lan))
            .route("/api/netixlan", get(handlers::list_memberships))
            .route("/api/net", get(handlers::list_networks))
            .route(&submit_base, any(submit::submit))
            .route(&format!("{}/", submit_base), any(submit::submit))
            .route(&format!("{}/{{asn}}", submit_base), any(submit::submit))
            .route_layer(middleware::from_fn(record_metrics))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(RequestBodyLimitLayer::new(config.api.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;

        let client = self.registry_client(addr)?;
        let merge = MergeWorker::from_config(client, &self.config.merge);

        match self.renderer.available() {
            Ok(sets) => tracing::info!(
                directory = %self.renderer.directory().display(),
                sets = ?sets.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "Template sets found"
            ),
            Err(e) => tracing::warn!(
                directory = %self.renderer.directory().display(),
                error = %e,
                "Template directory is not readable"
            ),
        }

        tracing::info!(
            address = %addr,
            namespace = %self.config.api.submit_namespace,
            merge_workers = merge.workers(),
            "HTTP server starting"
        );

        let state = AppState {
            registry: self.registry.clone(),
            merge,
            renderer: self.renderer.clone(),
        };
        let app = Self::build_router(&self.config, state);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Address to reach a listener bound at `addr` from this host.
fn loopback(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port())
        }
        IpAddr::V6(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port())
        }
        _ => addr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback() {
        let any: SocketAddr = "0.0.0.0:8001".parse().unwrap();
        assert_eq!(loopback(any), "127.0.0.1:8001".parse().unwrap());

        let any6: SocketAddr = "[::]:8001".parse().unwrap();
        assert_eq!(loopback(any6), "[::1]:8001".parse().unwrap());

        let bound: SocketAddr = "192.0.2.10:8001".parse().unwrap();
        assert_eq!(loopback(bound), bound);
    }

    #[test]
    fn test_registry_client_follows_config() {
        let mut config = ServerConfig::default();
        config.registry.url = Some("http://mirror.example/api".into());
        let server = HttpServer::new(config);
        assert!(server.registry_client("127.0.0.1:1".parse().unwrap()).is_ok());
    }
}

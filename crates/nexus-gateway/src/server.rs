use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;

use nexus_core::{ChatResponder, DocumentRegistry, Services};
use nexus_llm::any::AnyProvider;
use nexus_memory::DocumentCollection;
use nexus_memory::document::IngestionPipeline;

use crate::error::GatewayError;
use crate::router::build_router;

#[derive(Clone)]
pub(crate) struct AppState {
    pub responder: Arc<ChatResponder<AnyProvider>>,
    pub pipeline: Arc<IngestionPipeline>,
    pub registry: Arc<DocumentRegistry>,
    pub collection: DocumentCollection,
    pub started_at: Instant,
}

impl AppState {
    pub(crate) fn new(services: Services) -> Self {
        Self {
            responder: services.responder,
            pipeline: services.pipeline,
            registry: services.registry,
            collection: services.collection,
            started_at: Instant::now(),
        }
    }
}

pub struct GatewayServer {
    addr: SocketAddr,
    max_body_size: usize,
    services: Services,
    shutdown_rx: watch::Receiver<bool>,
}

impl GatewayServer {
    #[must_use]
    pub fn new(
        bind: &str,
        port: u16,
        services: Services,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let addr: SocketAddr = format!("{bind}:{port}").parse().unwrap_or_else(|e| {
            tracing::warn!("invalid bind '{bind}': {e}, falling back to 127.0.0.1:{port}");
            SocketAddr::from(([127, 0, 0, 1], port))
        });

        if bind == "0.0.0.0" {
            tracing::warn!("gateway binding to 0.0.0.0, reachable from other hosts");
        }

        Self {
            addr,
            max_body_size: 1_048_576,
            services,
            shutdown_rx,
        }
    }

    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Start the HTTP gateway server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or encounters a fatal I/O error.
    pub async fn serve(self) -> Result<(), GatewayError> {
        let router = build_router(AppState::new(self.services), self.max_body_size);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| GatewayError::Bind(self.addr.to_string(), e))?;
        tracing::info!("gateway listening on {}", self.addr);

        let mut shutdown_rx = self.shutdown_rx;
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                while !*shutdown_rx.borrow_and_update() {
                    if shutdown_rx.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                tracing::info!("gateway shutting down");
            })
            .await
            .map_err(|e| GatewayError::Server(format!("{e}")))?;

        Ok(())
    }
}

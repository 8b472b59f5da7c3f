//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, timeout, request ID)
//! - Serve static UI files for every other path
//! - Bind server to listener and stop on the shutdown broadcast

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::http::handlers::{get_logs, get_mapping, method_not_allowed, post_mapping};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::mapping::MappingService;
use crate::observability::LogBuffer;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub mapping: Arc<MappingService>,
    pub logs: LogBuffer,
}

/// HTTP server for the mapping API and UI.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server serving `static_root` next to the API.
    pub fn new(config: ServiceConfig, state: AppState, static_root: PathBuf) -> Self {
        Self {
            router: Self::build_router(&config, state, static_root),
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The body limit is enforced by the `Bytes` extractor, so an oversized
    /// patch is rejected by the handler as an unreadable body (400).
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState, static_root: PathBuf) -> Router {
        Router::new()
            .route(
                "/mapping",
                get(get_mapping)
                    .post(post_mapping)
                    .fallback(method_not_allowed),
            )
            .route("/api/logs", get(get_logs))
            .fallback_service(ServeDir::new(static_root))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Serve on `listener` until the shutdown broadcast fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

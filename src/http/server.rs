//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum service with all middleware
//! - Run the site router on every request
//! - Hand pass-through requests to static file serving
//! - Swap in new routing tables on config reload
//! - Observability (metrics, request IDs, trace spans)

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::SiteConfig;
use crate::http::request::{edge_request, UuidRequestId};
use crate::observability::metrics;
use crate::routing::SiteRouter;

/// Application state injected into the routing middleware.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ArcSwap<SiteRouter>>,
}

/// HTTP server fronting the site router.
pub struct HttpServer {
    app: Router,
    config: SiteConfig,
    router: Arc<ArcSwap<SiteRouter>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: SiteConfig) -> Self {
        let router = Arc::new(ArcSwap::from_pointee(SiteRouter::from_config(&config)));
        let state = AppState {
            router: router.clone(),
        };
        let app = Self::build_app(&config, state);
        Self { app, config, router }
    }

    /// Build the Axum service with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &SiteConfig, state: AppState) -> Router {
        let app = match &config.server.static_dir {
            Some(dir) => Router::new().fallback_service(ServeDir::new(dir)),
            None => Router::new().fallback(not_found),
        };

        app.layer(middleware::from_fn_with_state(state, route_request))
            .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The assembled service, for embedding or in-process testing.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Run the server until a shutdown signal arrives.
    ///
    /// Configurations received on `config_updates` replace the routing tables;
    /// listener, static directory and timeouts stay as started.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<SiteConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            canonical_host = %self.config.canonical_host,
            modules = self.config.modules.len(),
            "HTTP server starting"
        );

        let live = self.router.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                let router = SiteRouter::from_config(&config);
                tracing::info!(
                    canonical_host = %router.canonical_host(),
                    modules = router.modules().len(),
                    identities = router.webfinger().len(),
                    "Routing tables reloaded"
                );
                live.store(Arc::new(router));
            }
        });

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Routing middleware. Answers the request itself, or lets it continue
/// unmodified to the static file service.
async fn route_request(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let edge = edge_request(&request);
    let outcome = state.router.load().route(&edge);
    let kind = outcome.kind();

    tracing::debug!(
        host = %edge.host,
        uri = %edge.uri,
        outcome = kind,
        status = ?outcome.status(),
        "Routed request"
    );
    metrics::record_decision(kind);

    let response = match outcome.into_http_response() {
        Some(response) => response,
        None => next.run(request).await,
    };

    metrics::record_request(response.status().as_u16(), kind, start_time);
    response
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

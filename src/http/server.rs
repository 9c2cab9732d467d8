//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router: proxy prefix routes + static fallback
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Dispatch prefix requests to the forwarder and relay the answer
//! - Convert forwarding failures into the fixed JSON error response
//! - Serve until the shutdown signal, then drain

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::error::ProxyError;
use crate::http::forward::Forwarder;
use crate::http::relay::relay;
use crate::http::request::{
    propagate_request_id_layer, request_id, request_span, set_request_id_layer,
};
use crate::http::static_files::static_service;
use crate::lifecycle::shutdown::signalled;
use crate::observability::metrics;
use crate::security::headers::ResponseHeaderPolicy;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Forwarder,
    pub header_policy: Arc<ResponseHeaderPolicy>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ProxyError> {
        let state = AppState {
            forwarder: Forwarder::new(&config)?,
            header_policy: Arc::new(ResponseHeaderPolicy::from_config(&config.headers)),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let prefix = config.backend.path_prefix.as_str();

        Router::new()
            .route(prefix, any(proxy_handler))
            .route(&format!("{}/", prefix), any(proxy_handler))
            .route(&format!("{}/{{*rest}}", prefix), any(proxy_handler))
            .fallback_service(static_service(&config.static_files))
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::GATEWAY_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend.origin,
            prefix = %self.config.backend.path_prefix,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(signalled(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Forward a prefix request to the backend and relay the response.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request_id(request.headers()).to_string();

    tracing::debug!(
        request_id = %request_id,
        peer = %peer,
        method = %method,
        path = %path,
        "Proxying request"
    );

    match state.forwarder.forward(request).await {
        Ok(response) => {
            let status = response.status();
            metrics::record_request(method.as_str(), status.as_u16(), start);
            tracing::debug!(
                request_id = %request_id,
                status = %status,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Backend responded"
            );
            relay(response, &state.header_policy, &request_id)
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                error = %e,
                "Proxy error"
            );
            metrics::record_upstream_error(e.kind());
            metrics::record_request(method.as_str(), e.status().as_u16(), start);
            e.into_response()
        }
    }
}

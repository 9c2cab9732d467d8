//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::stream;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use album_gateway::config::GatewayConfig;
use album_gateway::http::HttpServer;
use album_gateway::lifecycle::Shutdown;

/// Serve `router` on an ephemeral local port.
pub async fn start_backend(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Describe the request back as JSON: method, path, query, headers and body.
pub async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let mut header_map = serde_json::Map::new();
    for name in headers.keys() {
        let values: Vec<Value> = headers
            .get_all(name)
            .iter()
            .map(|v| Value::String(v.to_str().unwrap_or_default().to_string()))
            .collect();
        header_map.insert(name.as_str().to_string(), Value::Array(values));
    }

    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": header_map,
        "body": String::from_utf8_lossy(&body),
    }))
}

/// Backend with a few album-like endpoints and an echo fallback.
///
/// `POST /api/raw` answers with exactly the bytes it received.
/// `GET /api/stream` sends `first-chunk|` at once and the rest only after
/// `release` is notified.
pub async fn start_album_backend(release: Arc<Notify>) -> SocketAddr {
    let router = Router::new()
        .route(
            "/api/album/create",
            post(|| async { (StatusCode::CREATED, Json(json!({"id": "a1"}))) }),
        )
        .route(
            "/api/headers",
            get(|| async {
                (
                    [
                        ("x-backend-secret", "s3cr3t"),
                        ("x-kept", "yes"),
                        ("content-type", "text/plain"),
                    ],
                    "headers",
                )
            }),
        )
        .route(
            "/api/raw",
            post(|body: Bytes| async move {
                ([("content-type", "application/octet-stream")], body)
            }),
        )
        .route(
            "/api/stream",
            get(move || {
                let release = release.clone();
                async move { streamed_response(release) }
            }),
        )
        .fallback(echo);

    start_backend(router).await
}

fn streamed_response(release: Arc<Notify>) -> impl IntoResponse {
    let chunks = stream::unfold(0u8, move |step| {
        let release = release.clone();
        async move {
            match step {
                0 => Some((Ok::<_, Infallible>(Bytes::from_static(b"first-chunk|")), 1)),
                1 => {
                    release.notified().await;
                    Some((Ok(Bytes::from(vec![b'x'; 64 * 1024])), 2))
                }
                2 => Some((Ok(Bytes::from_static(b"|last")), 3)),
                _ => None,
            }
        }
    });

    (
        [("content-type", "application/octet-stream")],
        Body::from_stream(chunks),
    )
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Gateway config pointing at `backend`, with metrics off and an empty static root.
pub fn gateway_config(backend: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.backend.origin = format!("http://{}", backend);
    config.observability.metrics_enabled = false;
    config.static_files.root = temp_dir().to_string_lossy().into_owned();
    config
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// Fresh empty directory under the system temp dir.
pub fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("album-gateway-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

//! Startup orchestration.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::signals::wait_for_signal;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Bring the gateway up with a validated config and serve until a signal arrives.
pub async fn run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend_origin = %config.backend.origin,
        path_prefix = %config.backend.path_prefix,
        static_root = %config.static_files.root,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let server = HttpServer::new(config.clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;
    Ok(())
}

//! Album gateway
//!
//! Serves the album web UI and forwards its API calls to the backend.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 ALBUM GATEWAY                 │
//!                         │                                               │
//!     Browser request     │  ┌──────────┐   /api/*   ┌───────────────┐    │
//!     ────────────────────┼─▶│  http    │───────────▶│   forwarder   │────┼───▶ Backend
//!                         │  │  router  │            │ (hyper client)│    │
//!                         │  └────┬─────┘            └───────┬───────┘    │
//!                         │       │ everything else          │            │
//!                         │       ▼                          ▼            │
//!     Browser response    │  ┌──────────┐            ┌───────────────┐    │
//!     ◀───────────────────┼──│  static  │            │     relay     │◀───┼──── Backend
//!                         │  │  files   │            │  (streaming)  │    │
//!                         │  └──────────┘            └───────────────┘    │
//!                         │                                               │
//!                         │  config · observability · security · lifecycle│
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use album_gateway::config::load_config;
use album_gateway::lifecycle::startup;
use album_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "album-gateway")]
#[command(about = "Static UI host and streaming API proxy for the album backend", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "album-gateway starting");

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

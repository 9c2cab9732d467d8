//! Album gateway library: streaming API proxy, static UI hosting, and a
//! client for the album backend's asynchronous image jobs.

pub mod client;
pub mod config;
pub mod http;
pub mod jobs;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use client::{BackendClient, ClientConfig};
pub use config::GatewayConfig;
pub use http::HttpServer;
pub use jobs::{JobPoller, PollPolicy, Uploader};
pub use lifecycle::Shutdown;

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → path under prefix?
//!         yes → forward.rs (build + send backend request)
//!             → relay.rs (status, filtered headers, streamed body)
//!             → on failure: error.rs (fixed JSON error response)
//!         no  → static_files.rs (UI bundle, index fallback)
//!     → Send to client
//! ```

pub mod error;
pub mod forward;
pub mod relay;
pub mod request;
pub mod server;
pub mod static_files;

pub use error::ProxyError;
pub use forward::Forwarder;
pub use request::X_REQUEST_ID;
pub use server::HttpServer;

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the album gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend origin and the path prefix routed to it.
    pub backend: BackendConfig,

    /// Prebuilt UI bundle served for everything outside the prefix.
    pub static_files: StaticFilesConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Response header policy.
    pub headers: HeaderPolicyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Backend origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend origin URL (e.g., "http://backend:8000").
    pub origin: String,

    /// Path prefix forwarded to the backend. Kept in the outbound path.
    pub path_prefix: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            origin: "http://backend:8000".to_string(),
            path_prefix: "/api".to_string(),
        }
    }
}

/// Static bundle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory holding the built UI bundle.
    pub root: String,

    /// File served for paths that match nothing in `root`.
    pub index: String,

    /// Gzip static responses when the client accepts it.
    pub compression: bool,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: "dist".to_string(),
            index: "index.html".to_string(),
            compression: true,
        }
    }
}

/// Request body limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum forwarded request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 50 * 1024 * 1024, // 50MB, large camera images
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Backend connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for the backend to produce response headers, in seconds.
    pub upstream_secs: u64,

    /// Total inbound request timeout in seconds.
    pub request_secs: u64,

    /// Idle pooled backend connection timeout in seconds.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 120,
            request_secs: 300,
            idle_secs: 60,
        }
    }
}

/// Which backend response headers reach the caller.
///
/// Hop-by-hop headers are always dropped regardless of these lists.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HeaderPolicyConfig {
    /// Headers removed from every relayed response.
    pub response_deny: Vec<String>,

    /// When set, only these headers are relayed.
    pub response_allow: Option<Vec<String>>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

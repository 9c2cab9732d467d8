//! Forwarding failures and their fixed client-facing form.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while forwarding one request to the backend.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The outbound request could not be built (bad URI, bad origin).
    #[error("invalid outbound request: {0}")]
    Construction(String),

    /// The backend could not be reached or the exchange failed.
    #[error("{0}")]
    Transport(String),

    /// The backend did not produce response headers in time.
    #[error("backend did not respond within {}s", .0.as_secs())]
    Timeout(Duration),

    /// The request body is larger than the configured cap.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
}

impl ProxyError {
    /// Build a transport error from a source chain, outermost first.
    pub fn transport(err: &(dyn std::error::Error + 'static)) -> Self {
        ProxyError::Transport(error_chain(err))
    }

    /// Status code returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Construction(_) => "construction",
            ProxyError::Transport(_) => "transport",
            ProxyError::Timeout(_) => "timeout",
            ProxyError::PayloadTooLarge { .. } => "payload_too_large",
        }
    }
}

/// JSON body of every proxy failure response.
#[derive(Debug, Serialize)]
pub struct ProxyErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = ProxyErrorBody {
            error: "Proxy error",
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Join an error and its sources into one line.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

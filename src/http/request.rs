//! Request identification.
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing (outermost layer)
//! - A caller-supplied `x-request-id` is kept, otherwise a UUID v4 is minted
//! - The ID travels to the backend with the other headers and back on the response

use axum::http::{HeaderMap, HeaderName, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the correlation ID.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation ID of a request, or `"unknown"` before the layer ran.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Layer assigning an ID to requests that arrive without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid)
}

/// Layer copying the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID.clone())
}

/// Span for one inbound request.
pub fn request_span<B>(request: &Request<B>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request.headers()),
    )
}

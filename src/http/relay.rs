//! Response Relay: hands the backend response to the caller as it streams in.
//!
//! The body is never collected. Each frame is pulled from the backend only
//! when the server transport asks for the next one, so a slow caller slows
//! the backend read instead of growing a buffer.

use axum::body::Body;
use axum::http::Response;
use http_body_util::BodyExt;
use hyper::body::Incoming;

use crate::security::headers::ResponseHeaderPolicy;

/// Rebuild the backend response for the caller: same status, filtered headers, streamed body.
pub fn relay(
    response: Response<Incoming>,
    policy: &ResponseHeaderPolicy,
    request_id: &str,
) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    parts.headers = policy.apply(&parts.headers);

    let request_id = request_id.to_string();
    let body = body.map_err(move |e| {
        // The transport aborts the response after this; nothing more is written.
        tracing::warn!(request_id = %request_id, error = %e, "Backend body failed mid-stream");
        e
    });

    Response::from_parts(parts, Body::new(body))
}

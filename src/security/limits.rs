//! Request body limits.
//!
//! # Responsibilities
//! - Reject a declared `Content-Length` above the cap before any backend I/O
//! - Cap streamed bodies that declare nothing (chunked uploads)
//! - Recognise the cap being hit from inside a transport error
//!
//! # Design Decisions
//! - Bodies are never buffered to enforce the cap; the stream itself errors
//! - Oversized requests return 413 Payload Too Large

use axum::body::Body;
use axum::http::{header, HeaderMap};
use http_body_util::{LengthLimitError, Limited};

/// Declared body length, if the client sent a parseable `Content-Length`.
pub fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Returns true if the declared length is already over `max`.
pub fn exceeds_declared_length(headers: &HeaderMap, max: usize) -> bool {
    declared_length(headers).is_some_and(|len| len > max as u64)
}

/// Wrap `body` so it yields an error once more than `max` bytes pass through.
pub fn limit_body(body: Body, max: usize) -> Body {
    Body::new(Limited::new(body, max))
}

/// Walk an error's source chain looking for the body cap being hit.
pub fn is_length_limit_error(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

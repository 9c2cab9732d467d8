//! HTTP Forwarder: turns an inbound request into the equivalent backend request.
//!
//! # Responsibilities
//! - Point the request URI at the backend origin, path and query unchanged
//! - Copy headers (Host rewritten, hop-by-hop dropped)
//! - Stream the body for methods that carry one, capped in size
//! - Bound connect and response-head time
//!
//! # Design Decisions
//! - `GET` and `HEAD` never forward a body, whatever the client sent
//! - No retries: a forwarded body is consumed by the first attempt

use std::str::FromStr;
use std::time::Duration;

use axum::body::Body;
use axum::http::uri::{Authority, Scheme};
use axum::http::{header, HeaderValue, Method, Request, Response, Uri};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::GatewayConfig;
use crate::http::error::ProxyError;
use crate::security::headers::outbound_request_headers;
use crate::security::limits::{exceeds_declared_length, is_length_limit_error, limit_body};

/// Parsed backend origin.
#[derive(Debug, Clone)]
pub struct BackendOrigin {
    scheme: Scheme,
    authority: Authority,
    host_header: HeaderValue,
    base_path: String,
}

impl BackendOrigin {
    /// Parse an origin such as `http://backend:8000`.
    pub fn parse(origin: &str) -> Result<Self, ProxyError> {
        let invalid = |reason: String| {
            ProxyError::Construction(format!("backend origin '{}': {}", origin, reason))
        };

        let url = url::Url::parse(origin).map_err(|e| invalid(e.to_string()))?;
        if url.scheme() != "http" {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        let host = url.host_str().ok_or_else(|| invalid("missing host".into()))?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self {
            scheme: Scheme::HTTP,
            authority: Authority::from_str(&authority).map_err(|e| invalid(e.to_string()))?,
            host_header: HeaderValue::from_str(&authority).map_err(|e| invalid(e.to_string()))?,
            base_path: url.path().trim_end_matches('/').to_string(),
        })
    }

    /// Value sent as the outbound `Host` header.
    pub fn host_header(&self) -> &HeaderValue {
        &self.host_header
    }

    /// Backend URI for an inbound path and query.
    pub fn uri_for(&self, path_and_query: &str) -> Result<Uri, ProxyError> {
        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(format!("{}{}", self.base_path, path_and_query))
            .build()
            .map_err(|e| ProxyError::Construction(e.to_string()))
    }
}

/// Returns true for methods whose body is forwarded.
pub fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}

/// Issues backend requests over a pooled client.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    origin: BackendOrigin,
    max_body_bytes: usize,
    upstream_timeout: Duration,
}

impl Forwarder {
    /// Build the forwarder from the gateway config.
    pub fn new(config: &GatewayConfig) -> Result<Self, ProxyError> {
        let origin = BackendOrigin::parse(&config.backend.origin)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(config.timeouts.idle_secs))
            .build(connector);

        Ok(Self {
            client,
            origin,
            max_body_bytes: config.limits.max_body_bytes,
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
        })
    }

    /// The origin requests are sent to.
    pub fn origin(&self) -> &BackendOrigin {
        &self.origin
    }

    /// Build the outbound request without sending it.
    pub fn outbound_request(&self, request: Request<Body>) -> Result<Request<Body>, ProxyError> {
        let (parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let uri = self.origin.uri_for(path_and_query)?;

        let mut headers = outbound_request_headers(&parts.headers, self.origin.host_header());

        let body = if carries_body(&parts.method) {
            if exceeds_declared_length(&parts.headers, self.max_body_bytes) {
                return Err(ProxyError::PayloadTooLarge {
                    limit: self.max_body_bytes,
                });
            }
            limit_body(body, self.max_body_bytes)
        } else {
            // Nothing is sent, so nothing may be declared.
            headers.remove(header::CONTENT_LENGTH);
            Body::empty()
        };

        let mut outbound = Request::builder()
            .method(parts.method)
            .uri(uri)
            .body(body)
            .map_err(|e| ProxyError::Construction(e.to_string()))?;
        *outbound.headers_mut() = headers;

        Ok(outbound)
    }

    /// Forward `request` and return the backend response with its body still unread.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response<Incoming>, ProxyError> {
        let outbound = self.outbound_request(request)?;

        match tokio::time::timeout(self.upstream_timeout, self.client.request(outbound)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) if is_length_limit_error(&e) => Err(ProxyError::PayloadTooLarge {
                limit: self.max_body_bytes,
            }),
            Ok(Err(e)) => Err(ProxyError::transport(&e)),
            Err(_) => Err(ProxyError::Timeout(self.upstream_timeout)),
        }
    }
}

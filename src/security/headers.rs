//! Header manipulation for both proxy directions.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers (including those named by `Connection`)
//! - Rewrite `Host` to the backend authority on the request path
//! - Apply the allow/deny policy on the response path
//!
//! # Design Decisions
//! - Multi-valued headers are preserved with `append`, never collapsed
//! - Framing headers belong to the transport on each hop

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::config::HeaderPolicyConfig;

/// Connection-scoped headers that never cross the proxy.
pub const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Header names listed in the `Connection` header, which are hop-by-hop as well.
fn connection_tokens(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Returns true if `name` is hop-by-hop given the message's `Connection` tokens.
pub fn is_hop_by_hop(name: &HeaderName, connection: &[String]) -> bool {
    let name = name.as_str();
    HOP_BY_HOP.contains(&name) || connection.iter().any(|t| t == name)
}

/// Copy inbound headers for the backend: drop `Host` and hop-by-hop, set `Host` to `authority`.
pub fn outbound_request_headers(inbound: &HeaderMap, authority: &HeaderValue) -> HeaderMap {
    let connection = connection_tokens(inbound);
    let mut headers = HeaderMap::with_capacity(inbound.len());

    for (name, value) in inbound.iter() {
        if name == header::HOST || is_hop_by_hop(name, &connection) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    headers.insert(header::HOST, authority.clone());
    headers
}

/// Response header filter built from [`HeaderPolicyConfig`].
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaderPolicy {
    deny: Vec<HeaderName>,
    allow: Option<Vec<HeaderName>>,
}

impl ResponseHeaderPolicy {
    /// Build the policy. Names were checked by config validation; unparseable ones are skipped.
    pub fn from_config(config: &HeaderPolicyConfig) -> Self {
        let parse = |names: &[String]| -> Vec<HeaderName> {
            names
                .iter()
                .filter_map(|n| HeaderName::from_bytes(n.trim().as_bytes()).ok())
                .collect()
        };

        Self {
            deny: parse(&config.response_deny),
            allow: config.response_allow.as_deref().map(parse),
        }
    }

    fn permits(&self, name: &HeaderName) -> bool {
        if self.deny.contains(name) {
            return false;
        }
        match &self.allow {
            Some(allow) => allow.contains(name),
            None => true,
        }
    }

    /// Filter backend response headers for the caller.
    pub fn apply(&self, backend: &HeaderMap) -> HeaderMap {
        let connection = connection_tokens(backend);
        let mut headers = HeaderMap::with_capacity(backend.len());

        for (name, value) in backend.iter() {
            if is_hop_by_hop(name, &connection) || !self.permits(name) {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }

        headers
    }
}

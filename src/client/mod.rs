//! Typed client for the backend album, image and job endpoints.
//!
//! # Responsibilities
//! - Build endpoint URLs under the gateway prefix
//! - Unwrap the backend's `{status, content}` envelope
//! - Turn non-success answers into errors carrying the backend's message
//!
//! # Design Decisions
//! - Every operation returns a `Result`; nothing is logged and dropped
//! - One pooled `reqwest::Client` per `BackendClient`, cheap to clone

pub mod albums;
pub mod error;
pub mod images;
pub mod jobs;
pub mod types;

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

pub use error::{ClientError, ClientResult};
pub use types::{Album, AlbumCreated, ImagePair, OperationResult, UploadAccepted};

use types::Envelope;

/// Where and how to reach the backend API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Gateway (or backend) base URL.
    pub base_url: String,
    /// Prefix under which the API lives.
    pub path_prefix: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            path_prefix: "/api".to_string(),
            timeout_secs: 120,
        }
    }
}

/// HTTP client for the backend API.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    api_root: Url,
}

impl BackendClient {
    /// Build a client with its own connection pool.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Self::with_http_client(http, config)
    }

    /// Build a client on an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, config: &ClientConfig) -> ClientResult<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("'{}': {}", config.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!("'{}' cannot be a base", config.base_url)));
        }

        let prefix = config.path_prefix.trim_matches('/');
        let mut root = format!("{}/", base.as_str().trim_end_matches('/'));
        if !prefix.is_empty() {
            root.push_str(prefix);
            root.push('/');
        }
        let api_root = Url::parse(&root).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        Ok(Self { http, api_root })
    }

    /// Root all endpoint paths are resolved against, e.g. `http://host:3000/api/`.
    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Endpoint for a fixed relative path such as `album/getAll`.
    pub(crate) fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.api_root
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Endpoint with a trailing path segment taken verbatim (percent-encoded).
    pub(crate) fn endpoint_with_segment(&self, path: &str, segment: &str) -> ClientResult<Url> {
        let mut url = self.endpoint(path)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.api_root.to_string()))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    /// POST a JSON body and decode the enveloped JSON answer.
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.http.post(self.endpoint(path)?).json(body).send().await?;
        decode(response).await
    }
}

/// Pass a success response through, or turn it into [`ClientError::Status`].
pub(crate) async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status,
        message: error_message(&body, status),
    })
}

/// Decode an enveloped JSON success response.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = check(response).await?.bytes().await?;
    serde_json::from_slice::<Envelope<T>>(&bytes)
        .map(Envelope::into_inner)
        .map_err(|e| ClientError::Decode(e.to_string()))
}

/// Pull a human-readable message out of a backend error body.
///
/// Handles a bare JSON string, `{detail}`, `{message}`, the `{content}`
/// envelope around any of those, and plain text.
pub fn error_message(body: &str, status: StatusCode) -> String {
    fn from_json(value: &serde_json::Value) -> Option<String> {
        match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Object(map) => ["detail", "message", "content"]
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(from_json),
            _ => None,
        }
    }

    let trimmed = body.trim();
    let parsed = serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|v| from_json(&v));

    match parsed {
        Some(message) => message,
        None if !trimmed.is_empty() => trimmed.to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

/// True when the backend said the resource does not exist.
pub(crate) fn is_not_found(err: &ClientError) -> bool {
    err.status() == Some(StatusCode::NOT_FOUND)
}

//! Backend API client failures.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors from calling the backend API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL or an endpoint could not be formed.
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),

    /// The request never completed (connect, timeout, reset).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// The response body was not what the endpoint promises.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// HTTP status when the backend answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// The backend's own message when it sent one, otherwise the full description.
    pub fn message(&self) -> String {
        match self {
            ClientError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for backend API calls.
pub type ClientResult<T> = Result<T, ClientError>;

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the backend origin and proxy prefix
//! - Validate value ranges (timeouts > 0, limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    match url::Url::parse(&config.backend.origin) {
        Ok(origin) => {
            if origin.scheme() != "http" {
                errors.push(ValidationError::new(
                    "backend.origin",
                    format!("unsupported scheme '{}', expected http", origin.scheme()),
                ));
            }
            if origin.host_str().is_none() {
                errors.push(ValidationError::new("backend.origin", "missing host"));
            }
            if origin.query().is_some() || origin.fragment().is_some() {
                errors.push(ValidationError::new(
                    "backend.origin",
                    "must not carry a query or fragment",
                ));
            }
        }
        Err(e) => errors.push(ValidationError::new(
            "backend.origin",
            format!("invalid URL '{}': {}", config.backend.origin, e),
        )),
    }

    let prefix = &config.backend.path_prefix;
    if !prefix.starts_with('/') || prefix.len() < 2 {
        errors.push(ValidationError::new(
            "backend.path_prefix",
            "must start with '/' and name at least one segment",
        ));
    } else if prefix.ends_with('/') {
        errors.push(ValidationError::new(
            "backend.path_prefix",
            "must not end with '/'",
        ));
    } else if prefix.contains('{') || prefix.contains('}') {
        errors.push(ValidationError::new(
            "backend.path_prefix",
            "must not contain route captures",
        ));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_body_bytes", "must be > 0"));
    }

    let timeouts = &config.timeouts;
    for (field, value) in [
        ("timeouts.connect_secs", timeouts.connect_secs),
        ("timeouts.upstream_secs", timeouts.upstream_secs),
        ("timeouts.request_secs", timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be > 0"));
        }
    }

    if config.static_files.index.is_empty() {
        errors.push(ValidationError::new("static_files.index", "must not be empty"));
    }

    let named = config
        .headers
        .response_deny
        .iter()
        .chain(config.headers.response_allow.iter().flatten());
    for name in named {
        if HeaderName::from_bytes(name.trim().as_bytes()).is_err() {
            errors.push(ValidationError::new(
                "headers",
                format!("'{}' is not a valid header name", name),
            ));
        }
    }

    if let Some(allow) = &config.headers.response_allow {
        if allow.is_empty() {
            errors.push(ValidationError::new(
                "headers.response_allow",
                "an empty allow list would drop every header; omit it instead",
            ));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.backend.origin = "ftp://files.local".into();
        config.backend.path_prefix = "api/".into();
        config.limits.max_body_bytes = 0;
        config.timeouts.upstream_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "backend.origin",
                "backend.path_prefix",
                "limits.max_body_bytes",
                "timeouts.upstream_secs",
            ]
        );
    }

    #[test]
    fn test_rejects_unparseable_origin() {
        let mut config = GatewayConfig::default();
        config.backend.origin = "not a url".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().starts_with("backend.origin: invalid URL"));
    }

    #[test]
    fn test_trailing_slash_prefix_rejected() {
        let mut config = GatewayConfig::default();
        config.backend.path_prefix = "/api/".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].message, "must not end with '/'");
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SkipConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::SkipConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
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

/// Check a parsed configuration, collecting every error.
pub fn validate_config(config: &SkipConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a socket address: {}", config.listener.bind_address, e),
        ));
    }

    let scheme = config.transport.scheme.to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        errors.push(ValidationError::new(
            "transport.scheme",
            format!("expected \"http\" or \"https\", got {:?}", config.transport.scheme),
        ));
    }
    if config.transport.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("transport.connect_timeout_secs", "must be > 0"));
    }
    if config.transport.max_request_body_bytes == 0 {
        errors.push(ValidationError::new("transport.max_request_body_bytes", "must be > 0"));
    }

    if config.rewrite.max_html_body_bytes == 0 {
        errors.push(ValidationError::new("rewrite.max_html_body_bytes", "must be > 0"));
    }

    if config.observability.metrics_enabled {
        if let Err(e) = config.observability.metrics_address.parse::<SocketAddr>() {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                format!("{:?} is not a socket address: {}", config.observability.metrics_address, e),
            ));
        }
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
    fn default_config_is_valid() {
        assert_eq!(validate_config(&SkipConfig::default()), Ok(()));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = SkipConfig::default();
        config.listener.bind_address = "localhost".into();
        config.transport.scheme = "scion".into();
        config.rewrite.max_html_body_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["listener.bind_address", "transport.scheme", "rewrite.max_html_body_bytes"]
        );
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = SkipConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
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

fn is_word(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }

    let namespace = &config.api.submit_namespace;
    if !is_word(namespace) {
        errors.push(ValidationError::new(
            "api.submit_namespace",
            "must be a single [A-Za-z0-9_] token",
        ));
    } else if namespace == "api" {
        errors.push(ValidationError::new(
            "api.submit_namespace",
            "`api` is reserved for the registry surface",
        ));
    }

    if config.api.max_body_size == 0 {
        errors.push(ValidationError::new("api.max_body_size", "must be positive"));
    }

    if config.cache.directory.as_os_str().is_empty() {
        errors.push(ValidationError::new("cache.directory", "must not be empty"));
    }
    if config.templates.directory.as_os_str().is_empty() {
        errors.push(ValidationError::new("templates.directory", "must not be empty"));
    }

    if let Some(raw) = &config.registry.url {
        match url::Url::parse(raw) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => errors.push(ValidationError::new(
                "registry.url",
                format!("unsupported scheme `{}`", parsed.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new("registry.url", e.to_string())),
        }
    }

    if config.registry.timeout_secs == 0 {
        errors.push(ValidationError::new("registry.timeout_secs", "must be positive"));
    }
    if config.merge.deadline_secs == 0 {
        errors.push(ValidationError::new("merge.deadline_secs", "must be positive"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be positive"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

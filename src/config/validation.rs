//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URL scheme and log level
//! - Check declarative routes: known method, `Controller@action` handler
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CraftConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::CraftConfig;
use crate::handler::HandlerRef;
use crate::routing::HttpMethod;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check `config`, collecting every problem found.
pub fn validate_config(config: &CraftConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("invalid socket address '{}'", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be greater than 0"));
    }

    if !matches!(config.url.scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::new(
            "url.scheme",
            format!("expected http or https, got '{}'", config.url.scheme),
        ));
    }
    if config.url.host.trim().is_empty() {
        errors.push(ValidationError::new("url.host", "must not be empty"));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    for (i, route) in config.routes.iter().enumerate() {
        let any = route.method.eq_ignore_ascii_case("ANY");
        if any && route.api {
            errors.push(ValidationError::new(
                format!("routes[{i}].method"),
                "ANY is not available for api routes",
            ));
        } else if !any && route.method.parse::<HttpMethod>().is_err() {
            errors.push(ValidationError::new(
                format!("routes[{i}].method"),
                format!("unsupported method '{}'", route.method),
            ));
        }
        if HandlerRef::parse(&route.handler).is_err() {
            errors.push(ValidationError::new(
                format!("routes[{i}].handler"),
                format!("expected Controller@action, got '{}'", route.handler),
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
    use crate::config::RouteConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&CraftConfig::default()).is_ok());
    }

    #[test]
    fn test_route_checks() {
        let mut config = CraftConfig::default();
        config.routes.push(RouteConfig {
            method: "any".into(),
            path: "/x".into(),
            handler: "Home@index".into(),
            name: None,
            middleware: Vec::new(),
            api: true,
        });
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "routes[0].method");
    }

    #[test]
    fn test_bad_addresses() {
        let mut config = CraftConfig::default();
        config.server.bind_address = "nowhere".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "also-nowhere".into();
        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["server.bind_address", "observability.metrics_address"]);
    }
}

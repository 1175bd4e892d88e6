//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::UrlBase;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CraftConfig {
    /// HTTP listener and request limits.
    pub server: ServerConfig,

    /// Where the application is served; used for URL building.
    pub url: UrlConfig,

    pub self_test: SelfTestConfig,

    pub observability: ObservabilityConfig,

    pub security: SecurityConfig,

    /// Declarative routes, registered after the built-in application routes.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Upper bound for one request, handler included.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Serving environment for generated URLs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UrlConfig {
    /// `http` or `https`; overridden per request by `X-Forwarded-Proto`.
    pub scheme: String,

    /// Fallback when the request carries no `Host` header.
    pub host: String,

    /// Mount point, stripped from request paths (e.g. "/app").
    pub base_path: String,
}

impl Default for UrlConfig {
    fn default() -> Self {
        let base = UrlBase::default();
        Self {
            scheme: base.scheme,
            host: base.host,
            base_path: base.base_path,
        }
    }
}

impl From<&UrlConfig> for UrlBase {
    fn from(config: &UrlConfig) -> Self {
        UrlBase {
            scheme: config.scheme.clone(),
            host: config.host.clone(),
            base_path: config.base_path.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SelfTestConfig {
    /// Substituted for every `{param}` placeholder.
    pub value: String,
}

impl Default for SelfTestConfig {
    fn default() -> Self {
        Self {
            value: "1".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Token the `csrf` middleware expects in the `_token` field or
    /// `X-CSRF-TOKEN` header.
    pub csrf_token: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            csrf_token: "change-me".to_string(),
        }
    }
}

/// One declarative route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// HTTP method, or `ANY` for all seven.
    pub method: String,

    pub path: String,

    /// `Controller@action`.
    pub handler: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Named middleware keys, run in order.
    #[serde(default)]
    pub middleware: Vec<String>,

    /// Register in the api space.
    #[serde(default)]
    pub api: bool,
}

//! Error taxonomy for registration and dispatch.
//!
//! # Design Decisions
//! - Registration errors (`DuplicateRoute`, `InvalidHandler`, ...) are fatal to
//!   startup and surface through `?` from the registration API
//! - 400/404/405 are *not* errors: they are terminal dispatch outcomes, see
//!   [`crate::dispatch::Rejection`]
//! - Everything returned as `Err` from dispatch is 500-class; the hosting
//!   boundary decides how to present it

use thiserror::Error;

use crate::routing::{HttpMethod, RouteSpace};

/// Errors raised by the router.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The same (method, pattern) was registered twice in one route space.
    #[error("Duplicate route detected: {method} {path}{}", api_suffix(.space))]
    DuplicateRoute {
        method: HttpMethod,
        path: String,
        space: RouteSpace,
    },

    /// A route pattern could not be compiled into a matcher.
    #[error("Invalid route pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The handler is neither a function nor a controller action.
    #[error("500 Internal Server Error: Invalid route handler: {0}")]
    InvalidHandler(String),

    /// A controller or one of its dependencies could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    /// A route references a named middleware nobody registered.
    #[error("500 Internal Server Error: Middleware not registered: {0}")]
    UnknownMiddleware(String),

    /// `leave_group` without a matching `enter_group`, or dispatch with open groups.
    #[error("Unbalanced route groups: {0}")]
    UnbalancedGroup(String),

    /// An HTTP method outside the seven supported verbs.
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
}

/// Handler resolution failures (the 500-class `HandlerResolutionError` family).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("500 Internal Server Error: Class not found: {class}")]
    ClassNotFound { class: String },

    #[error("500 Internal Server Error: Method {method}() not found in class {class}")]
    MethodNotFound { class: String, method: String },

    #[error("500 Internal Server Error: Cannot resolve parameter ${parameter} for class {class}")]
    UnresolvableParameter { parameter: String, class: String },

    #[error("500 Internal Server Error: Circular dependency while resolving {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },
}

fn api_suffix(space: &RouteSpace) -> &'static str {
    match space {
        RouteSpace::Standard => "",
        RouteSpace::Api => " (API)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_route_display() {
        let err = RouterError::DuplicateRoute {
            method: HttpMethod::Get,
            path: "/users".into(),
            space: RouteSpace::Standard,
        };
        assert_eq!(err.to_string(), "Duplicate route detected: GET /users");

        let err = RouterError::DuplicateRoute {
            method: HttpMethod::Post,
            path: "/api/users".into(),
            space: RouteSpace::Api,
        };
        assert_eq!(err.to_string(), "Duplicate route detected: POST /api/users (API)");
    }

    #[test]
    fn test_resolve_error_display() {
        let err = ResolveError::UnresolvableParameter {
            parameter: "limit".into(),
            class: "ReportController".into(),
        };
        assert_eq!(
            err.to_string(),
            "500 Internal Server Error: Cannot resolve parameter $limit for class ReportController"
        );

        let err = ResolveError::CircularDependency {
            chain: vec!["A".into(), "B".into(), "A".into()],
        };
        assert!(err.to_string().ends_with("A -> B -> A"));
    }
}

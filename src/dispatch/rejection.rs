//! Terminal dispatch outcomes that are returned, not raised.

use axum::http::{header, HeaderValue, StatusCode};
use thiserror::Error;

use crate::dispatch::Response;
use crate::routing::{HttpMethod, RouteSpace};

/// A request that ends without reaching a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The path is a parametrized route's literal skeleton without the parameter.
    #[error("400 Bad Request: Missing required parameter for {}route {pattern}.", api_label(.space))]
    MissingPathParameter { pattern: String, space: RouteSpace },

    #[error("405 Method Not Allowed: The requested URL {path} does not support {method}. Allowed: {}", join_methods(.allowed))]
    MethodNotAllowed {
        path: String,
        method: String,
        allowed: Vec<HttpMethod>,
    },

    #[error("404 Not Found")]
    NotFound { path: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    CsrfMismatch { message: String },
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::MissingPathParameter { .. } => StatusCode::BAD_REQUEST,
            Rejection::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Rejection::NotFound { .. } => StatusCode::NOT_FOUND,
            Rejection::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            // 419 is not registered with IANA; `from_u16` accepts it.
            Rejection::CsrfMismatch { .. } => {
                StatusCode::from_u16(419).unwrap_or(StatusCode::FORBIDDEN)
            }
        }
    }

    /// The response sent for this rejection. A 404 has an empty body.
    pub fn into_response(self) -> Response {
        let status = self.status();
        let mut response = match &self {
            Rejection::NotFound { .. } => Response::new(status, ""),
            _ => Response::new(status, self.to_string()),
        };

        if let Rejection::MethodNotAllowed { allowed, .. } = &self {
            if let Ok(value) = HeaderValue::from_str(&join_methods(allowed)) {
                response.headers.insert(header::ALLOW, value);
            }
        }
        response.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=UTF-8"),
        );
        response
    }
}

fn api_label(space: &RouteSpace) -> &'static str {
    match space {
        RouteSpace::Standard => "",
        RouteSpace::Api => "API ",
    }
}

fn join_methods(methods: &[HttpMethod]) -> String {
    methods
        .iter()
        .map(HttpMethod::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let response = Rejection::MethodNotAllowed {
            path: "/a".into(),
            method: "POST".into(),
            allowed: vec![HttpMethod::Get, HttpMethod::Put],
        }
        .into_response();
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.header("allow"), Some("GET, PUT"));
        assert!(response.body.contains("does not support POST"));
    }

    #[test]
    fn test_missing_parameter_message() {
        let rejection = Rejection::MissingPathParameter {
            pattern: "/api/x/{id}".into(),
            space: RouteSpace::Api,
        };
        assert_eq!(
            rejection.to_string(),
            "400 Bad Request: Missing required parameter for API route /api/x/{id}."
        );
    }

    #[test]
    fn test_not_found_has_empty_body() {
        let response = Rejection::NotFound { path: "/nope".into() }.into_response();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_csrf_status() {
        let rejection = Rejection::CsrfMismatch {
            message: "CSRF token mismatch!".into(),
        };
        assert_eq!(rejection.status().as_u16(), 419);
    }
}

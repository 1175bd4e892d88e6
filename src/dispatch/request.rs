//! Transport-neutral request descriptor.

use std::collections::HashMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Form field that overrides the method of a POST.
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// One inbound request as the router sees it.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: String,
    /// Raw request target; may carry a query string.
    pub path: String,
    pub post_params: HashMap<String, String>,
    pub headers: HeaderMap,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_post_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.post_params.insert(key.into(), value.into());
        self
    }

    /// Header value as text; `None` if absent or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn post_param(&self, key: &str) -> Option<&str> {
        self.post_params.get(key).map(String::as_str)
    }

    /// Method used for routing: a POST may carry `_method=PUT` and friends.
    pub fn effective_method(&self) -> String {
        if self.method.eq_ignore_ascii_case("POST") {
            if let Some(method) = self.post_param(METHOD_OVERRIDE_FIELD) {
                if !method.trim().is_empty() {
                    return method.trim().to_ascii_uppercase();
                }
            }
        }
        self.method.to_ascii_uppercase()
    }

    /// Path used for routing.
    ///
    /// Drops query and fragment, strips `base_path` when the path lives under
    /// it, removes the trailing slash; an empty result becomes `/`.
    pub fn normalized_path(&self, base_path: &str) -> String {
        let end = self.path.find(['?', '#']).unwrap_or(self.path.len());
        let mut path = &self.path[..end];

        let base = base_path.trim_end_matches('/');
        if !base.is_empty() {
            if let Some(rest) = path.strip_prefix(base) {
                if rest.is_empty() || rest.starts_with('/') {
                    path = rest;
                }
            }
        }

        let path = path.trim_end_matches('/');
        if path.is_empty() {
            "/".to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_path() {
        assert_eq!(Request::new("GET", "/users/").normalized_path(""), "/users");
        assert_eq!(Request::new("GET", "").normalized_path(""), "/");
        assert_eq!(Request::new("GET", "/").normalized_path(""), "/");
        assert_eq!(Request::new("GET", "/users?page=2").normalized_path(""), "/users");
        assert_eq!(Request::new("GET", "/app/users").normalized_path("/app"), "/users");
        assert_eq!(Request::new("GET", "/app").normalized_path("/app/"), "/");
        assert_eq!(Request::new("GET", "/application").normalized_path("/app"), "/application");
    }

    #[test]
    fn test_method_override() {
        let request = Request::new("POST", "/items/1").with_post_param("_method", "delete");
        assert_eq!(request.effective_method(), "DELETE");

        let request = Request::new("GET", "/items/1").with_post_param("_method", "DELETE");
        assert_eq!(request.effective_method(), "GET");

        assert_eq!(Request::new("post", "/").effective_method(), "POST");
    }
}

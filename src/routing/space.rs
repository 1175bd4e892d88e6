//! Route spaces: human-facing routes vs JSON api routes.

use std::fmt;

use serde::Serialize;

/// Partition of the routing tables.
///
/// Both spaces are matched with the same rules; they differ in how middleware
/// results and handler replies are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSpace {
    Standard,
    Api,
}

impl RouteSpace {
    /// Lookup order used by the dispatcher.
    pub const ALL: [RouteSpace; 2] = [RouteSpace::Standard, RouteSpace::Api];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteSpace::Standard => "standard",
            RouteSpace::Api => "api",
        }
    }
}

impl fmt::Display for RouteSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Force an api pattern under `/api/`.
///
/// `users` and `/users` become `/api/users`, `api/users` becomes `/api/users`,
/// a bare `api` becomes `/api/`.
pub fn normalize_api_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.starts_with("api/") {
        format!("/{trimmed}")
    } else if trimmed == "api" {
        "/api/".to_string()
    } else {
        format!("/api/{trimmed}")
    }
}

//! Named routes and URL generation.
//!
//! # Responsibilities
//! - Map a symbolic name to (method, pattern)
//! - Build absolute URLs from a name and positional parameters
//!
//! # Design Decisions
//! - Last definition wins; names are not checked for duplicates
//! - Parameters fill placeholders strictly left to right; unfilled
//!   placeholders stay in the URL as-is
//! - Repeated slashes are collapsed except directly after a `:` so the
//!   scheme separator survives

use std::sync::LazyLock;

use axum::http::header;
use indexmap::IndexMap;
use regex::{Captures, Regex};

use crate::dispatch::Request;
use crate::routing::method::HttpMethod;
use crate::routing::pattern::substitute;

static REPEATED_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(:?)/{2,}").expect("slash regex is valid"));

/// Target of a named route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteNameEntry {
    pub method: HttpMethod,
    pub pattern: String,
}

/// Scheme, host and base path the application is served under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBase {
    pub scheme: String,
    pub host: String,
    pub base_path: String,
}

impl Default for UrlBase {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            base_path: String::new(),
        }
    }
}

impl UrlBase {
    /// Take scheme and host from the request, falling back to `self`.
    ///
    /// `X-Forwarded-Proto` decides the scheme, `Host` the host.
    pub fn for_request(&self, request: &Request) -> UrlBase {
        let scheme = request
            .header(header::FORWARDED.as_str())
            .and_then(forwarded_proto)
            .or_else(|| request.header("x-forwarded-proto"))
            .filter(|s| matches!(*s, "http" | "https"))
            .unwrap_or(self.scheme.as_str())
            .to_string();
        let host = request
            .header(header::HOST.as_str())
            .unwrap_or(self.host.as_str())
            .to_string();
        UrlBase {
            scheme,
            host,
            base_path: self.base_path.clone(),
        }
    }

    /// The base path without trailing slash; `/` becomes empty.
    pub fn normalized_base_path(&self) -> String {
        self.base_path
            .replace('\\', "/")
            .trim_end_matches('/')
            .to_string()
    }
}

fn forwarded_proto(value: &str) -> Option<&str> {
    value
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.eq_ignore_ascii_case("proto"))
        .map(|(_, proto)| proto.trim_matches('"'))
}

/// Collapse runs of `/` into one, except `://`.
pub fn collapse_slashes(url: &str) -> String {
    REPEATED_SLASHES
        .replace_all(url, |caps: &Captures<'_>| {
            if caps[1].is_empty() {
                "/".to_string()
            } else {
                "://".to_string()
            }
        })
        .into_owned()
}

/// Name → route registry.
#[derive(Debug, Clone, Default)]
pub struct RouteNameRegistry {
    entries: IndexMap<String, RouteNameEntry>,
}

impl RouteNameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any earlier binding.
    pub fn define(&mut self, name: impl Into<String>, method: HttpMethod, pattern: impl Into<String>) {
        let name = name.into();
        let pattern = pattern.into();
        tracing::debug!(name = %name, method = %method, pattern = %pattern, "Route name defined");
        self.entries.insert(name, RouteNameEntry { method, pattern });
    }

    pub fn get(&self, name: &str) -> Option<&RouteNameEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteNameEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absolute URL for `name`, or `None` if the name is unknown.
    pub fn build<S: AsRef<str>>(&self, name: &str, params: &[S], base: &UrlBase) -> Option<String> {
        let entry = self.entries.get(name)?;
        let mut path = substitute(&entry.pattern, params);
        if path != "/" && !path.starts_with('/') {
            path.insert(0, '/');
        }

        let url = format!(
            "{}://{}{}{}",
            base.scheme,
            base.host,
            base.normalized_base_path(),
            path
        );
        Some(collapse_slashes(&url))
    }
}

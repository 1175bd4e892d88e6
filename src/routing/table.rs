//! Route storage.
//!
//! # Responsibilities
//! - Keep routes per space and method, in registration order
//! - Reject duplicate (method, pattern) pairs per space
//! - Exact lookup by literal path, then ordered pattern fallback
//! - Diagnostics: which methods know a path, which route lacks a parameter
//!
//! # Design Decisions
//! - `IndexMap` keyed by method, then by full pattern: O(1) exact lookup while
//!   iteration stays in registration order at both levels
//! - Overlapping patterns resolve by registration order, not specificity
//! - First registration wins; a duplicate leaves the table untouched

use indexmap::IndexMap;

use crate::error::RouterError;
use crate::handler::HandlerRef;
use crate::middleware::MiddlewareRef;
use crate::routing::method::HttpMethod;
use crate::routing::pattern::PathPattern;
use crate::routing::space::RouteSpace;

/// A registered route.
#[derive(Debug, Clone)]
pub struct Route {
    pub space: RouteSpace,
    pub method: HttpMethod,
    pub pattern: PathPattern,
    pub handler: HandlerRef,
    /// Group middleware first, then route middleware.
    pub middleware: Vec<MiddlewareRef>,
}

impl Route {
    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }
}

type MethodRoutes = IndexMap<String, Route>;

/// Routing tables for both spaces.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    standard: IndexMap<HttpMethod, MethodRoutes>,
    api: IndexMap<HttpMethod, MethodRoutes>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn space(&self, space: RouteSpace) -> &IndexMap<HttpMethod, MethodRoutes> {
        match space {
            RouteSpace::Standard => &self.standard,
            RouteSpace::Api => &self.api,
        }
    }

    /// Add a route. `pattern` must already carry any group prefix.
    pub fn register(
        &mut self,
        space: RouteSpace,
        method: HttpMethod,
        pattern: &str,
        handler: HandlerRef,
        middleware: Vec<MiddlewareRef>,
    ) -> Result<&Route, RouterError> {
        if self.contains(space, method, pattern) {
            return Err(RouterError::DuplicateRoute {
                method,
                path: pattern.to_string(),
                space,
            });
        }

        let route = Route {
            space,
            method,
            pattern: PathPattern::compile(pattern)?,
            handler,
            middleware,
        };

        let routes = match space {
            RouteSpace::Standard => &mut self.standard,
            RouteSpace::Api => &mut self.api,
        };
        let entry = routes
            .entry(method)
            .or_default()
            .entry(pattern.to_string())
            .or_insert(route);
        Ok(entry)
    }

    pub fn contains(&self, space: RouteSpace, method: HttpMethod, pattern: &str) -> bool {
        self.space(space)
            .get(&method)
            .is_some_and(|routes| routes.contains_key(pattern))
    }

    /// Route registered under exactly this path.
    pub fn lookup_exact(&self, space: RouteSpace, method: HttpMethod, path: &str) -> Option<&Route> {
        self.space(space).get(&method)?.get(path)
    }

    /// Routes for one method, in registration order.
    pub fn iter(&self, space: RouteSpace, method: HttpMethod) -> impl Iterator<Item = &Route> {
        self.space(space)
            .get(&method)
            .into_iter()
            .flat_map(|routes| routes.values())
    }

    /// First route (in registration order) whose pattern matches, with captures.
    pub fn find_pattern(
        &self,
        space: RouteSpace,
        method: HttpMethod,
        path: &str,
    ) -> Option<(&Route, Vec<String>)> {
        self.iter(space, method)
            .find_map(|route| route.pattern.captures(path).map(|params| (route, params)))
    }

    /// Methods under which some route in either space recognizes `path`.
    ///
    /// Deduplicated, in order of discovery: standard space first, methods in
    /// the order their first route was registered.
    pub fn allowed_methods(&self, path: &str) -> Vec<HttpMethod> {
        let mut allowed = Vec::new();
        for space in RouteSpace::ALL {
            for (&method, routes) in self.space(space) {
                let known = routes.contains_key(path)
                    || routes.values().any(|r| r.pattern.matches(path));
                if known && !allowed.contains(&method) {
                    allowed.push(method);
                }
            }
        }
        allowed
    }

    /// First route whose literal skeleton equals `path` (parameter segment absent).
    pub fn missing_parameter(&self, space: RouteSpace, method: HttpMethod, path: &str) -> Option<&Route> {
        self.iter(space, method)
            .find(|route| route.pattern.is_missing_parameter(path))
    }

    /// Every route, grouped by method, standard before api within a method.
    pub fn all_routes(&self) -> impl Iterator<Item = &Route> {
        HttpMethod::ALL.into_iter().flat_map(move |method| {
            RouteSpace::ALL
                .into_iter()
                .flat_map(move |space| self.iter(space, method))
        })
    }

    pub fn len(&self) -> usize {
        self.standard
            .values()
            .chain(self.api.values())
            .map(IndexMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

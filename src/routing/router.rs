//! The router: registration API and dispatch entry point.
//!
//! # Responsibilities
//! - Own the route tables, name registry, group stack and middleware registry
//! - Apply the active group frame to every registration
//! - Hand requests to the [`Dispatcher`]
//!
//! # Design Decisions
//! - One explicit instance; nothing is process-global
//! - Registration takes `&mut self`, dispatch takes `&self`, so the borrow
//!   checker keeps the two phases apart
//! - `all()` is transactional: a duplicate under any method registers nothing

use crate::config::RouteConfig;
use crate::dispatch::{Dispatcher, Request, RequestContext, Response};
use crate::error::RouterError;
use crate::handler::{Container, HandlerRef};
use crate::middleware::{Flow, MiddlewareRef, MiddlewareRegistry};
use crate::routing::group::GroupContext;
use crate::routing::method::HttpMethod;
use crate::routing::names::{RouteNameRegistry, UrlBase};
use crate::routing::space::{normalize_api_path, RouteSpace};
use crate::routing::table::{Route, RouteTable};
use crate::selftest::{SelfTestReport, SelfTestRunner};

/// Route registration and dispatch.
#[derive(Debug, Default)]
pub struct Router {
    table: RouteTable,
    names: RouteNameRegistry,
    groups: GroupContext,
    /// Target of a `name()` call right after a registration.
    last_registered: Option<(HttpMethod, String)>,
    middleware: MiddlewareRegistry,
    standard_middleware: Vec<MiddlewareRef>,
    api_middleware: Vec<MiddlewareRef>,
    container: Container,
    default_handler: Option<HandlerRef>,
    url_base: UrlBase,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router resolving controllers through `container`.
    pub fn with_container(container: Container) -> Self {
        Self {
            container,
            ..Self::default()
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    /// Register named middleware, referenced from routes as `"key".into()`.
    pub fn register_middleware<F>(&mut self, key: impl Into<String>, middleware: F) -> &mut Self
    where
        F: Fn(&mut RequestContext<'_>) -> Flow + Send + Sync + 'static,
    {
        self.middleware.register(key, middleware);
        self
    }

    pub fn middleware_registry(&self) -> &MiddlewareRegistry {
        &self.middleware
    }

    /// Middleware run before every standard route.
    pub fn add_middleware(&mut self, middleware: impl Into<MiddlewareRef>) -> &mut Self {
        self.standard_middleware.push(middleware.into());
        self
    }

    /// Middleware run before every api route.
    pub fn add_api_middleware(&mut self, middleware: impl Into<MiddlewareRef>) -> &mut Self {
        self.api_middleware.push(middleware.into());
        self
    }

    pub fn global_middleware(&self, space: RouteSpace) -> &[MiddlewareRef] {
        match space {
            RouteSpace::Standard => &self.standard_middleware,
            RouteSpace::Api => &self.api_middleware,
        }
    }

    pub fn set_url_base(&mut self, base: UrlBase) -> &mut Self {
        self.url_base = base;
        self
    }

    pub fn url_base(&self) -> &UrlBase {
        &self.url_base
    }

    /// Pattern a registration of `pattern` in `space` would be stored under.
    fn full_pattern(&self, space: RouteSpace, pattern: &str) -> String {
        let frame = self.groups.current();
        let path = if frame.prefix.is_empty() {
            pattern.to_string()
        } else {
            frame.full_path(pattern)
        };
        match space {
            RouteSpace::Standard => path,
            RouteSpace::Api => normalize_api_path(&path),
        }
    }

    /// Register a route under the active group frame.
    ///
    /// Group middleware runs before `middleware`. If the group carries a name,
    /// the route also gets a derived name.
    pub fn register(
        &mut self,
        space: RouteSpace,
        method: HttpMethod,
        pattern: &str,
        handler: HandlerRef,
        middleware: &[MiddlewareRef],
    ) -> Result<&mut Self, RouterError> {
        let full = self.full_pattern(space, pattern);
        let frame = self.groups.current();
        let chain: Vec<MiddlewareRef> = frame.middleware.iter().chain(middleware).cloned().collect();
        let derived = if frame.prefix.is_empty() {
            None
        } else {
            frame.derived_name(pattern)
        };

        self.table.register(space, method, &full, handler, chain)?;
        tracing::debug!(space = %space, method = %method, pattern = %full, "Route registered");

        if let Some(name) = derived {
            self.names.define(name, method, full.clone());
        }
        self.last_registered = Some((method, full));
        Ok(self)
    }

    pub fn get(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        self.register(RouteSpace::Standard, HttpMethod::Get, pattern, handler, middleware)
    }

    pub fn post(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        self.register(RouteSpace::Standard, HttpMethod::Post, pattern, handler, middleware)
    }

    pub fn put(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        self.register(RouteSpace::Standard, HttpMethod::Put, pattern, handler, middleware)
    }

    pub fn delete(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        self.register(RouteSpace::Standard, HttpMethod::Delete, pattern, handler, middleware)
    }

    pub fn patch(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        self.register(RouteSpace::Standard, HttpMethod::Patch, pattern, handler, middleware)
    }

    pub fn head(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        self.register(RouteSpace::Standard, HttpMethod::Head, pattern, handler, middleware)
    }

    pub fn options(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        self.register(RouteSpace::Standard, HttpMethod::Options, pattern, handler, middleware)
    }

    /// Register `pattern` for all seven methods, or for none of them.
    ///
    /// A following `name()` binds the GET route.
    pub fn all(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        let full = self.full_pattern(RouteSpace::Standard, pattern);
        if let Some(method) = HttpMethod::ALL
            .into_iter()
            .find(|&method| self.table.contains(RouteSpace::Standard, method, &full))
        {
            return Err(RouterError::DuplicateRoute {
                method,
                path: full,
                space: RouteSpace::Standard,
            });
        }

        for method in HttpMethod::ALL {
            self.register(RouteSpace::Standard, method, pattern, handler.clone(), middleware)?;
        }
        self.last_registered = Some((HttpMethod::Get, full));
        Ok(self)
    }

    pub fn api_get(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        self.register(RouteSpace::Api, HttpMethod::Get, pattern, handler, middleware)
    }

    pub fn api_post(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        self.register(RouteSpace::Api, HttpMethod::Post, pattern, handler, middleware)
    }

    pub fn api_put(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        self.register(RouteSpace::Api, HttpMethod::Put, pattern, handler, middleware)
    }

    pub fn api_delete(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        self.register(RouteSpace::Api, HttpMethod::Delete, pattern, handler, middleware)
    }

    pub fn api_patch(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        self.register(RouteSpace::Api, HttpMethod::Patch, pattern, handler, middleware)
    }

    pub fn api_head(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        self.register(RouteSpace::Api, HttpMethod::Head, pattern, handler, middleware)
    }

    pub fn api_options(&mut self, pattern: &str, handler: HandlerRef, middleware: &[MiddlewareRef]) -> Result<&mut Self, RouterError> {
        self.register(RouteSpace::Api, HttpMethod::Options, pattern, handler, middleware)
    }

    /// Open a group scope; it closes when the returned guard is dropped.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        self.enter_group(prefix);
        Group { router: self }
    }

    /// Open a group scope that must be closed with [`leave_group`](Self::leave_group).
    pub fn enter_group(&mut self, prefix: &str) -> &mut Self {
        self.groups.enter(prefix);
        self.last_registered = None;
        tracing::trace!(prefix = %self.groups.current().prefix, depth = self.groups.depth(), "Entered route group");
        self
    }

    pub fn leave_group(&mut self) -> Result<&mut Self, RouterError> {
        self.groups.leave()?;
        self.last_registered = None;
        Ok(self)
    }

    pub fn group_depth(&self) -> usize {
        self.groups.depth()
    }

    /// Name the route registered just before, or else the active group.
    ///
    /// The active frame's name prefix is prepended either way.
    pub fn name(&mut self, name: &str) -> &mut Self {
        let full = format!("{}{}", self.groups.current().name_prefix, name);
        match &self.last_registered {
            Some((method, pattern)) => self.names.define(full, *method, pattern.clone()),
            None => self.groups.set_name(full),
        }
        self
    }

    pub fn name_prefix(&mut self, prefix: &str) -> &mut Self {
        self.groups.set_name_prefix(prefix.to_string());
        self
    }

    /// Replace the active group's middleware.
    pub fn middleware(&mut self, middleware: &[MiddlewareRef]) -> &mut Self {
        self.groups.set_middleware(middleware.to_vec());
        self
    }

    /// Catch-all run when nothing matches; its reply is sent with status 404
    /// unless it sets another.
    pub fn default_handler(&mut self, handler: HandlerRef) -> &mut Self {
        self.default_handler = Some(handler);
        self
    }

    pub fn default_route_handler(&self) -> Option<&HandlerRef> {
        self.default_handler.as_ref()
    }

    /// URL of a named route against the configured base.
    pub fn route<S: AsRef<str>>(&self, name: &str, params: &[S]) -> Option<String> {
        self.names.build(name, params, &self.url_base)
    }

    /// URL of a named route against the host of `request`.
    pub fn route_for<S: AsRef<str>>(&self, request: &Request, name: &str, params: &[S]) -> Option<String> {
        self.names.build(name, params, &self.url_base.for_request(request))
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn names(&self) -> &RouteNameRegistry {
        &self.names
    }

    /// Every route, by method, standard before api.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.table.all_routes()
    }

    pub fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(self)
    }

    pub fn dispatch(&self, request: &Request) -> Result<Response, RouterError> {
        self.dispatcher().dispatch(request)
    }

    /// Register routes declared in configuration.
    pub fn load_routes(&mut self, routes: &[RouteConfig]) -> Result<&mut Self, RouterError> {
        for route in routes {
            let handler = HandlerRef::parse(&route.handler)?;
            let middleware: Vec<MiddlewareRef> = route.middleware.iter().map(|m| m.as_str().into()).collect();
            let space = if route.api { RouteSpace::Api } else { RouteSpace::Standard };

            if route.method.eq_ignore_ascii_case("ANY") && !route.api {
                self.all(&route.path, handler, &middleware)?;
            } else {
                let method: HttpMethod = route.method.parse()?;
                self.register(space, method, &route.path, handler, &middleware)?;
            }
            if let Some(name) = &route.name {
                self.name(name);
            }
        }
        tracing::info!(count = routes.len(), "Configured routes loaded");
        Ok(self)
    }

    /// Replay every route with `value` in each placeholder.
    pub fn self_test(&self, value: &str) -> SelfTestReport {
        SelfTestRunner::new(self, value).run()
    }
}

/// A group scope. Dropping it restores the parent frame.
pub struct Group<'r> {
    router: &'r mut Router,
}

impl Group<'_> {
    /// Name for routes registered in this group (`admin.` + dotted path).
    pub fn name(self, name: &str) -> Self {
        self.router.name(name);
        self
    }

    pub fn name_prefix(self, prefix: &str) -> Self {
        self.router.name_prefix(prefix);
        self
    }

    pub fn middleware(self, middleware: &[MiddlewareRef]) -> Self {
        self.router.middleware(middleware);
        self
    }

    /// Register the group's routes. The scope closes afterwards, also on error.
    pub fn action<F>(self, routes: F) -> Result<(), RouterError>
    where
        F: FnOnce(&mut Router) -> Result<(), RouterError>,
    {
        routes(&mut *self.router)
    }
}

impl Drop for Group<'_> {
    fn drop(&mut self) {
        if self.router.leave_group().is_err() {
            tracing::warn!("Route group was already closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Reply;
    use crate::handler::from_fn;

    fn ok() -> HandlerRef {
        from_fn(|_ctx| "ok")
    }

    #[test]
    fn test_group_prefix_and_restore() {
        let mut router = Router::new();
        router
            .group("/admin")
            .action(|r| {
                r.get("/users", ok(), &[])?;
                Ok(())
            })
            .unwrap();
        router.get("/users", ok(), &[]).unwrap();

        assert!(router.table().contains(RouteSpace::Standard, HttpMethod::Get, "/admin/users"));
        assert!(router.table().contains(RouteSpace::Standard, HttpMethod::Get, "/users"));
        assert_eq!(router.group_depth(), 0);
    }

    #[test]
    fn test_group_restored_on_error() {
        let mut router = Router::new();
        router.get("/admin/x", ok(), &[]).unwrap();
        let err = router
            .group("/admin")
            .action(|r| {
                r.get("/x", ok(), &[])?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, RouterError::DuplicateRoute { .. }));
        assert_eq!(router.group_depth(), 0);
    }

    #[test]
    fn test_nested_groups_with_names_and_middleware() {
        let mut router = Router::new();
        router
            .group("/admin")
            .middleware(&["auth".into()])
            .name("admin.")
            .action(|r| {
                r.get("/users/list", ok(), &["log".into()])?;
                r.group("/reports").action(|r| {
                    r.get("/daily", ok(), &[])?;
                    Ok(())
                })
            })
            .unwrap();

        let route = router
            .table()
            .lookup_exact(RouteSpace::Standard, HttpMethod::Get, "/admin/users/list")
            .unwrap();
        let keys: Vec<_> = route.middleware.iter().map(|m| format!("{m:?}")).collect();
        assert_eq!(keys, vec![r#"Named("auth")"#, r#"Named("log")"#]);
        assert_eq!(router.route("admin.users.list", &[] as &[&str]).as_deref(), Some("http://localhost/admin/users/list"));

        // The nested frame starts without name or middleware.
        let nested = router
            .table()
            .lookup_exact(RouteSpace::Standard, HttpMethod::Get, "/admin/reports/daily")
            .unwrap();
        assert!(nested.middleware.is_empty());
    }

    #[test]
    fn test_name_last_registered_route_with_prefix() {
        let mut router = Router::new();
        router.get("/profile/{id}", ok(), &[]).unwrap().name("profile.show");
        assert_eq!(
            router.route("profile.show", &["7"]).as_deref(),
            Some("http://localhost/profile/7")
        );

        router
            .group("/shop")
            .name_prefix("shop.")
            .action(|r| {
                r.get("/cart", ok(), &[])?.name("cart");
                Ok(())
            })
            .unwrap();
        assert_eq!(router.names().get("shop.cart").unwrap().pattern, "/shop/cart");
    }

    #[test]
    fn test_all_is_transactional() {
        let mut router = Router::new();
        router.put("/items", ok(), &[]).unwrap();
        let err = router.all("/items", ok(), &[]).unwrap_err();
        assert!(matches!(err, RouterError::DuplicateRoute { method: HttpMethod::Put, .. }));
        assert_eq!(router.table().len(), 1);

        router.all("/any", ok(), &[]).unwrap();
        assert_eq!(router.table().len(), 8);
    }

    #[test]
    fn test_name_after_all_binds_get() {
        let mut router = Router::new();
        router.all("/hello/{name}", ok(), &[]).unwrap().name("hello");
        let entry = router.names().get("hello").unwrap();
        assert_eq!(entry.method, HttpMethod::Get);
        assert_eq!(entry.pattern, "/hello/{name}");
    }

    #[test]
    fn test_api_paths_are_normalized() {
        let mut router = Router::new();
        router.api_get("hello/{name}", ok(), &[]).unwrap();
        router.api_post("/api/items", ok(), &[]).unwrap();
        assert!(router.table().contains(RouteSpace::Api, HttpMethod::Get, "/api/hello/{name}"));
        assert!(router.table().contains(RouteSpace::Api, HttpMethod::Post, "/api/items"));

        let err = router.api_get("/hello/{name}", ok(), &[]).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate route detected: GET /api/hello/{name} (API)");
    }

    #[test]
    fn test_explicit_groups_must_balance() {
        let mut router = Router::new();
        router.enter_group("/v1");
        router.get("/x", ok(), &[]).unwrap();
        assert!(matches!(
            router.dispatch(&Request::new("GET", "/v1/x")),
            Err(RouterError::UnbalancedGroup(_))
        ));

        router.leave_group().unwrap();
        assert!(router.leave_group().is_err());
        let response = router.dispatch(&Request::new("GET", "/v1/x")).unwrap();
        assert_eq!(response.body, "ok");
    }

    #[test]
    fn test_load_routes_from_config() {
        let routes = vec![
            RouteConfig {
                method: "GET".into(),
                path: "/home".into(),
                handler: "HomeController@index".into(),
                name: Some("home".into()),
                middleware: vec!["auth".into()],
                api: false,
            },
            RouteConfig {
                method: "ANY".into(),
                path: "/echo".into(),
                handler: "EchoController@echo".into(),
                name: None,
                middleware: Vec::new(),
                api: false,
            },
        ];
        let mut router = Router::new();
        router.load_routes(&routes).unwrap();
        assert_eq!(router.table().len(), 8);
        assert_eq!(router.names().get("home").unwrap().pattern, "/home");

        let bad = vec![RouteConfig {
            handler: "nope".into(),
            ..routes[0].clone()
        }];
        assert!(matches!(Router::new().load_routes(&bad), Err(RouterError::InvalidHandler(_))));
    }

    #[test]
    fn test_reply_type_from_handler() {
        let mut router = Router::new();
        router.get("/", from_fn(|_ctx| Reply::Empty), &[]).unwrap();
        let response = router.dispatch(&Request::new("GET", "/")).unwrap();
        assert!(response.body.is_empty());
    }
}

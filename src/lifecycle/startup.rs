//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated configuration into a ready [`Router`]
//! - Register the built-in application, then the configured routes
//!
//! # Design Decisions
//! - Fail fast: any registration error is fatal
//! - Configured routes come last, so they cannot shadow built-in ones
//!   silently; a collision is a `DuplicateRoute` error

use crate::app;
use crate::config::CraftConfig;
use crate::error::RouterError;
use crate::routing::{Router, UrlBase};

/// Build the application router described by `config`.
pub fn build_router(config: &CraftConfig) -> Result<Router, RouterError> {
    let mut router = Router::with_container(app::container());
    router.set_url_base(UrlBase::from(&config.url));

    app::register(&mut router, config)?;
    router.load_routes(&config.routes)?;

    tracing::info!(
        routes = router.table().len(),
        names = router.names().len(),
        "Router ready"
    );
    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;

    #[test]
    fn test_configured_route_collision_is_fatal() {
        let mut config = CraftConfig::default();
        config.routes.push(RouteConfig {
            method: "GET".into(),
            path: "/".into(),
            handler: "HomeController@index".into(),
            name: None,
            middleware: Vec::new(),
            api: false,
        });
        assert!(matches!(build_router(&config), Err(RouterError::DuplicateRoute { .. })));
    }

    #[test]
    fn test_configured_routes_are_added() {
        let mut config = CraftConfig::default();
        config.routes.push(RouteConfig {
            method: "GET".into(),
            path: "/about".into(),
            handler: "HomeController@about".into(),
            name: Some("about".into()),
            middleware: Vec::new(),
            api: false,
        });
        let router = build_router(&config).unwrap();
        assert_eq!(router.route("about", &[] as &[&str]).as_deref(), Some("http://localhost/about"));
    }
}

//! Demo application wired onto the router.
//!
//! # Responsibilities
//! - Bind services and controllers in the container
//! - Register the `auth` and `csrf` middleware
//! - Register the web and api routes plus the 404 page
//!
//! Routes:
//! ```text
//! GET  /                   HomeController@index          (home)
//! ANY  /hello/{name}       closure                       (hello)
//! GET  /account/profile    HomeController@profile        (account.profile, auth)
//! POST /account/profile    HomeController@update         (account.update, auth + csrf)
//! GET  /api/hello/{name}   closure, JSON
//! GET  /api/hello/{param}  closure, JSON (shadowed by the route above)
//! ```

pub mod controller;
pub mod middleware;

use serde_json::json;

use crate::config::CraftConfig;
use crate::dispatch::RequestContext;
use crate::error::RouterError;
use crate::handler::{from_fn, Container, HandlerRef};
use crate::routing::Router;

pub use controller::{HomeController, SiteInfo};

/// Container with the demo services and controllers.
pub fn container() -> Container {
    let mut container = Container::new();
    container
        .instance(SiteInfo::default())
        .controller::<HomeController>();
    container
}

fn hello(ctx: &mut RequestContext<'_>) -> String {
    format!("Hello, {}", html_escape::encode_text(ctx.param(0).unwrap_or_default()))
}

/// Register middleware and routes.
pub fn register(router: &mut Router, config: &CraftConfig) -> Result<(), RouterError> {
    middleware::register(router, &config.security);

    router
        .get("/", HandlerRef::action::<HomeController>("index"), &[])?
        .name("home");
    router.all("/hello/{name}", from_fn(hello), &[])?.name("hello");

    router
        .group("/account")
        .middleware(&["auth".into()])
        .name_prefix("account.")
        .action(|r| {
            r.get("/profile", HandlerRef::action::<HomeController>("profile"), &[])?
                .name("profile");
            r.post("/profile", HandlerRef::action::<HomeController>("update"), &["csrf".into()])?
                .name("update");
            Ok(())
        })?;

    router.api_get(
        "/hello/{name}",
        from_fn(|ctx| json!({"message": hello(ctx)})),
        &[],
    )?;
    router.api_get(
        "/hello/{param}",
        from_fn(|ctx| json!({"message": hello(ctx)})),
        &[],
    )?;

    router.default_handler(from_fn(|_ctx| NOT_FOUND_PAGE));
    Ok(())
}

const NOT_FOUND_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Error 404</title>
  <style>
    html, body { height: 100%; margin: 0; }
    body {
      display: flex; align-items: center; justify-content: center;
      color: #777; font-family: -apple-system, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
      font-size: clamp(12px, 5vw, 60px);
    }
  </style>
</head>
<body>Error 404</body>
</html>
"#;

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use craft_router::config::CraftConfig;
use craft_router::handler::{from_fn, Container, Controller, HandlerRef, Injectable, Resolver};
use craft_router::lifecycle::Shutdown;
use craft_router::middleware::Flow;
use craft_router::{HttpServer, Reply, Request, RequestContext, ResolveError, Router};
use serde_json::json;

/// Repository dependency for [`UserController`].
pub struct UserStore {
    pub names: Vec<&'static str>,
}

pub struct UserController {
    store: Arc<UserStore>,
}

impl Injectable for UserController {
    fn construct(resolver: &Resolver<'_>) -> Result<Self, ResolveError> {
        Ok(Self {
            store: resolver.resolve::<UserStore>()?,
        })
    }
}

impl Controller for UserController {
    const NAME: &'static str = "UserController";

    fn call_action(&self, action: &str, ctx: &mut RequestContext<'_>) -> Option<Reply> {
        match action {
            "show" => {
                let index: usize = ctx.param(0)?.parse().ok()?;
                let name = self.store.names.get(index).copied().unwrap_or("nobody");
                Some(format!("user {name}").into())
            }
            "list" => Some(json!({"users": self.store.names}).into()),
            _ => None,
        }
    }
}

pub fn container() -> Container {
    let mut container = Container::new();
    container
        .instance(UserStore {
            names: vec!["ada", "grace"],
        })
        .controller::<UserController>();
    container
}

/// A router exercising both spaces, groups, names and middleware.
pub fn fixture_router() -> Router {
    let mut router = Router::with_container(container());
    router
        .register_middleware("deny", |ctx: &mut RequestContext<'_>| {
            ctx.set_status(axum::http::StatusCode::UNAUTHORIZED);
            ctx.write("Unauthorized access!");
            Flow::Halt
        })
        .register_middleware("forbid", |_ctx: &mut RequestContext<'_>| {
            Flow::Respond(json!({"code": 403, "error": "forbidden"}).into())
        });

    router.get("/a", from_fn(|_ctx| "a"), &[]).unwrap();
    router.get("/users/{id}", HandlerRef::action::<UserController>("show"), &[]).unwrap();
    router.get("/x/{id}", from_fn(|ctx| format!("x{}", ctx.param(0).unwrap_or_default())), &[]).unwrap();
    router.get("/profile/{id}", from_fn(|_ctx| "profile"), &[]).unwrap().name("profile.show");
    router.get("/private", from_fn(|_ctx| "secret"), &["deny".into()]).unwrap();
    router.get("/broken", HandlerRef::bound("UserController", "explode"), &[]).unwrap();
    router.get("/ghost", HandlerRef::bound("GhostController", "index"), &[]).unwrap();

    router
        .group("/admin")
        .name("admin.")
        .action(|r| {
            r.get("/users", from_fn(|_ctx| "admin users"), &[])?;
            Ok(())
        })
        .unwrap();
    router.get("/users", from_fn(|_ctx| "public users"), &[]).unwrap();

    router.api_get("/users", HandlerRef::action::<UserController>("list"), &[]).unwrap();
    router.api_get("/secure", from_fn(|_ctx| json!({"ok": true})), &["forbid".into()]).unwrap();
    router.api_get("/nothing", from_fn(|_ctx| Reply::Empty), &[]).unwrap();
    router.api_get("/items/{id}", from_fn(|ctx| json!({"id": ctx.param(0)})), &[]).unwrap();

    router
}

pub fn get(router: &Router, path: &str) -> craft_router::Response {
    router.dispatch(&Request::new("GET", path)).unwrap()
}

/// Serve `router` on an ephemeral port; returns its address and the shutdown handle.
pub async fn spawn_server(config: CraftConfig, router: Router) -> (SocketAddr, Shutdown) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::new(router));
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

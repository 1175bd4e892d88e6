//! Craft router: an MVC-style request router.
//!
//! Two route spaces (HTML and JSON api), nested groups, named routes,
//! middleware pipelines, controller resolution through a dependency
//! container, and an axum hosting adapter.

pub mod app;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod routing;
pub mod selftest;

pub use config::CraftConfig;
pub use dispatch::{Reply, Request, RequestContext, Response};
pub use error::{ResolveError, RouterError};
pub use handler::{Container, Controller, HandlerRef, Injectable};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use middleware::{Flow, MiddlewareRef};
pub use routing::{HttpMethod, RouteSpace, Router};

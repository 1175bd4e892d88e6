//! `auth` and `csrf` middleware.

use crate::config::SecurityConfig;
use crate::dispatch::{Rejection, RequestContext};
use crate::middleware::Flow;
use crate::routing::Router;

/// Form field carrying the CSRF token.
pub const CSRF_FIELD: &str = "_csrf";
pub const CSRF_HEADER: &str = "x-csrf-token";

pub fn register(router: &mut Router, security: &SecurityConfig) {
    let token = security.csrf_token.clone();
    router
        .register_middleware("auth", authenticate)
        .register_middleware("csrf", move |ctx: &mut RequestContext<'_>| verify_csrf(ctx, &token));
}

/// Requires an `Authorization` header.
fn authenticate(ctx: &mut RequestContext<'_>) -> Flow {
    let authorized = ctx
        .request()
        .header("authorization")
        .is_some_and(|value| !value.trim().is_empty());
    if authorized {
        return Flow::Continue;
    }
    tracing::debug!(path = %ctx.request().path, "Unauthenticated request rejected");
    ctx.reject(Rejection::Unauthorized {
        message: "Unauthorized access!".to_string(),
    })
}

/// Checks the token on state-changing methods only.
fn verify_csrf(ctx: &mut RequestContext<'_>, expected: &str) -> Flow {
    let request = ctx.request();
    if !matches!(request.effective_method().as_str(), "POST" | "PUT" | "DELETE") {
        return Flow::Continue;
    }

    let token = request
        .post_param(CSRF_FIELD)
        .or_else(|| request.header(CSRF_HEADER));
    if token == Some(expected) {
        return Flow::Continue;
    }
    tracing::debug!(path = %request.path, "CSRF token mismatch");
    ctx.reject(Rejection::CsrfMismatch {
        message: "CSRF token mismatch!".to_string(),
    })
}

//! The per-request state machine.
//!
//! # Data Flow
//! ```text
//! Request
//!     → normalize method (+ `_method` override) and path
//!     → standard exact → standard pattern → api exact → api pattern
//!     → matched: middleware → handler → HTML echo / JSON envelope
//!     → no match: 405 → 400 (standard) → 400 (api) → default handler → 404
//! ```

use std::time::Instant;

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use serde_json::json;

use crate::dispatch::{Reply, Rejection, Request, RequestContext, Response};
use crate::error::RouterError;
use crate::middleware::{MiddlewarePipeline, PipelineOutcome};
use crate::observability::metrics;
use crate::routing::{HttpMethod, Route, RouteSpace, Router};

const HTML_CONTENT_TYPE: &str = "text/html; charset=UTF-8";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Runs one request against a [`Router`].
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    router: &'a Router,
}

impl<'a> Dispatcher<'a> {
    pub fn new(router: &'a Router) -> Self {
        Self { router }
    }

    /// Dispatch across both route spaces.
    ///
    /// 400/404/405 come back as `Ok`; `Err` is always 500-class.
    pub fn dispatch(&self, request: &Request) -> Result<Response, RouterError> {
        self.run(request, &RouteSpace::ALL)
    }

    /// Dispatch against one route space only; diagnostics still see both.
    pub fn dispatch_space(&self, space: RouteSpace, request: &Request) -> Result<Response, RouterError> {
        self.run(request, &[space])
    }

    fn run(&self, request: &Request, spaces: &[RouteSpace]) -> Result<Response, RouterError> {
        let depth = self.router.group_depth();
        if depth > 0 {
            return Err(RouterError::UnbalancedGroup(format!(
                "{depth} route group(s) still open at dispatch"
            )));
        }

        let started = Instant::now();
        let method_name = request.effective_method();
        let path = request.normalized_path(&self.router.url_base().base_path);
        let method = method_name.parse::<HttpMethod>().ok();

        let matched = method.and_then(|method| {
            spaces
                .iter()
                .find_map(|&space| self.match_route(space, method, &path))
        });

        let space = matched.as_ref().map(|(route, _)| route.space);
        let result = match matched {
            Some((route, params)) => {
                tracing::debug!(
                    method = %method_name,
                    path = %path,
                    space = %route.space,
                    pattern = %route.path(),
                    "Route matched"
                );
                self.run_route(route, params, request)
            }
            None => self.diagnose(request, method, &method_name, &path),
        };

        match &result {
            Ok(response) => {
                tracing::info!(
                    method = %method_name,
                    path = %path,
                    status = response.status.as_u16(),
                    "Request dispatched"
                );
                metrics::record_request(&method_name, response.status.as_u16(), space, started);
            }
            Err(e) => {
                tracing::error!(method = %method_name, path = %path, error = %e, "Dispatch failed");
                metrics::record_request(&method_name, 500, space, started);
            }
        }
        result
    }

    /// Exact lookup first, then patterns in registration order.
    fn match_route(&self, space: RouteSpace, method: HttpMethod, path: &str) -> Option<(&'a Route, Vec<String>)> {
        let table = self.router.table();
        if let Some(route) = table.lookup_exact(space, method, path) {
            let params = route.pattern.captures(path).unwrap_or_default();
            return Some((route, params));
        }
        table.find_pattern(space, method, path)
    }

    fn run_route(&self, route: &Route, params: Vec<String>, request: &Request) -> Result<Response, RouterError> {
        let base = self.router.url_base().for_request(request);
        let mut ctx = RequestContext::new(request, params).with_urls(self.router.names(), base);

        let chain = self
            .router
            .global_middleware(route.space)
            .iter()
            .chain(route.middleware.iter());
        let outcome = MiddlewarePipeline::new(self.router.middleware_registry()).run(route.space, chain, &mut ctx)?;

        match (route.space, outcome) {
            (RouteSpace::Standard, PipelineOutcome::Proceed) => {
                let reply = route.handler.invoke(self.router.container(), &mut ctx)?;
                Ok(standard_response(ctx, reply, StatusCode::OK))
            }
            (RouteSpace::Standard, PipelineOutcome::Halted) => {
                Ok(standard_response(ctx, Reply::Empty, StatusCode::OK))
            }
            (RouteSpace::Standard, PipelineOutcome::Responded(reply)) => {
                Ok(standard_response(ctx, reply, StatusCode::OK))
            }
            (RouteSpace::Api, PipelineOutcome::Proceed) => {
                let reply = route.handler.invoke(self.router.container(), &mut ctx)?;
                if reply.is_empty() {
                    tracing::warn!(pattern = %route.path(), "Api handler returned nothing");
                    ctx.set_status(StatusCode::NOT_FOUND);
                    return Ok(api_response(ctx, json!({"error": "Invalid API route"}).into(), StatusCode::NOT_FOUND));
                }
                Ok(api_response(ctx, reply, StatusCode::OK))
            }
            (RouteSpace::Api, PipelineOutcome::Halted) => {
                Ok(api_response(ctx, Reply::Json(false.into()), StatusCode::BAD_REQUEST))
            }
            (RouteSpace::Api, PipelineOutcome::Responded(reply)) => {
                Ok(api_response(ctx, reply, StatusCode::BAD_REQUEST))
            }
        }
    }

    fn diagnose(
        &self,
        request: &Request,
        method: Option<HttpMethod>,
        method_name: &str,
        path: &str,
    ) -> Result<Response, RouterError> {
        let table = self.router.table();

        let allowed = table.allowed_methods(path);
        if !allowed.is_empty() && !method.is_some_and(|m| allowed.contains(&m)) {
            tracing::warn!(method = %method_name, path = %path, allowed = ?allowed, "Method not allowed");
            return Ok(Rejection::MethodNotAllowed {
                path: path.to_string(),
                method: method_name.to_string(),
                allowed,
            }
            .into_response());
        }

        if let Some(method) = method {
            for space in RouteSpace::ALL {
                if let Some(route) = table.missing_parameter(space, method, path) {
                    tracing::warn!(method = %method, path = %path, pattern = %route.path(), "Missing path parameter");
                    return Ok(Rejection::MissingPathParameter {
                        pattern: route.path().to_string(),
                        space,
                    }
                    .into_response());
                }
            }
        }

        if let Some(handler) = self.router.default_route_handler() {
            let base = self.router.url_base().for_request(request);
            let mut ctx = RequestContext::new(request, Vec::new()).with_urls(self.router.names(), base);
            let reply = handler.invoke(self.router.container(), &mut ctx)?;
            return Ok(standard_response(ctx, reply, StatusCode::NOT_FOUND));
        }

        tracing::debug!(method = %method_name, path = %path, "No route found");
        Ok(Rejection::NotFound { path: path.to_string() }.into_response())
    }
}

/// Echo semantics: everything written to the context, then the reply.
fn standard_response(ctx: RequestContext<'_>, reply: Reply, default_status: StatusCode) -> Response {
    let (status, headers, mut body) = ctx.into_parts();
    body.push_str(&reply.into_text());
    Response {
        status: status.unwrap_or(default_status),
        headers: with_content_type(headers, HTML_CONTENT_TYPE),
        body,
    }
}

/// JSON envelope; the reply's `code` wins over any status set on the context.
fn api_response(ctx: RequestContext<'_>, reply: Reply, default_status: StatusCode) -> Response {
    let (status, headers, _) = ctx.into_parts();
    let (status, body) = reply.into_api(status.unwrap_or(default_status));
    let mut headers = headers;
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    Response { status, headers, body }
}

fn with_content_type(mut headers: HeaderMap, content_type: &'static str) -> HeaderMap {
    headers
        .entry(header::CONTENT_TYPE)
        .or_insert(HeaderValue::from_static(content_type));
    headers
}

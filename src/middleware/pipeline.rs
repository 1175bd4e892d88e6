//! Ordered middleware execution for one matched route.

use serde_json::Value;

use crate::dispatch::{Reply, RequestContext};
use crate::error::RouterError;
use crate::middleware::{Flow, MiddlewareRef, MiddlewareRegistry};
use crate::routing::RouteSpace;

/// Result of running a middleware chain.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Every middleware passed; call the handler.
    Proceed,
    /// Stop without a reply of our own.
    Halted,
    /// Stop and emit this reply.
    Responded(Reply),
}

/// Runs middleware chains against a registry.
#[derive(Debug, Clone, Copy)]
pub struct MiddlewarePipeline<'a> {
    registry: &'a MiddlewareRegistry,
}

impl<'a> MiddlewarePipeline<'a> {
    pub fn new(registry: &'a MiddlewareRegistry) -> Self {
        Self { registry }
    }

    /// Run `chain` in order until one middleware short-circuits.
    pub fn run<'m, I>(
        &self,
        space: RouteSpace,
        chain: I,
        ctx: &mut RequestContext<'_>,
    ) -> Result<PipelineOutcome, RouterError>
    where
        I: IntoIterator<Item = &'m MiddlewareRef>,
    {
        for middleware in chain {
            let flow = match middleware {
                MiddlewareRef::Named(key) => self
                    .registry
                    .run(key, ctx)
                    .ok_or_else(|| RouterError::UnknownMiddleware(key.clone()))?,
                MiddlewareRef::Inline(inline) => inline.handle(ctx),
            };

            let outcome = match space {
                RouteSpace::Standard => standard_outcome(middleware, flow),
                RouteSpace::Api => api_outcome(flow),
            };
            if let Some(outcome) = outcome {
                tracing::debug!(space = %space, middleware = ?middleware, outcome = ?outcome, "Middleware short-circuited");
                return Ok(outcome);
            }
        }
        Ok(PipelineOutcome::Proceed)
    }
}

fn standard_outcome(middleware: &MiddlewareRef, flow: Flow) -> Option<PipelineOutcome> {
    match (middleware, flow) {
        (_, Flow::Continue) => None,
        (_, Flow::Halt) => Some(PipelineOutcome::Halted),
        // Named middleware signals only through `Halt`; a reply is ignored.
        (MiddlewareRef::Named(_), Flow::Respond(_)) => None,
        (MiddlewareRef::Inline(_), Flow::Respond(reply)) => Some(PipelineOutcome::Responded(reply)),
    }
}

fn api_outcome(flow: Flow) -> Option<PipelineOutcome> {
    match flow {
        Flow::Continue => None,
        Flow::Halt => Some(PipelineOutcome::Responded(Reply::Json(Value::Bool(false)))),
        Flow::Respond(reply) => Some(PipelineOutcome::Responded(reply)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Request;
    use crate::middleware::from_fn;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn registry() -> MiddlewareRegistry {
        let mut registry = MiddlewareRegistry::new();
        registry.register("pass", |_ctx: &mut RequestContext<'_>| Flow::Continue);
        registry.register("deny", |ctx: &mut RequestContext<'_>| {
            ctx.write("denied");
            Flow::Halt
        });
        registry.register("reply", |_ctx: &mut RequestContext<'_>| {
            Flow::Respond(json!({"code": 403, "error": "forbidden"}).into())
        });
        registry
    }

    fn run(space: RouteSpace, chain: &[MiddlewareRef]) -> Result<PipelineOutcome, RouterError> {
        let registry = registry();
        let request = Request::new("GET", "/");
        let mut ctx = RequestContext::new(&request, Vec::new());
        MiddlewarePipeline::new(&registry).run(space, chain, &mut ctx)
    }

    #[test]
    fn test_all_pass() {
        let chain = vec!["pass".into(), from_fn(|_| Flow::Continue)];
        assert_eq!(run(RouteSpace::Standard, &chain).unwrap(), PipelineOutcome::Proceed);
    }

    #[test]
    fn test_named_halt_stops_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let chain = vec![
            "deny".into(),
            from_fn(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Flow::Continue
            }),
        ];
        assert_eq!(run(RouteSpace::Standard, &chain).unwrap(), PipelineOutcome::Halted);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_named_reply_ignored_in_standard_space() {
        let chain: Vec<MiddlewareRef> = vec!["reply".into()];
        assert_eq!(run(RouteSpace::Standard, &chain).unwrap(), PipelineOutcome::Proceed);
    }

    #[test]
    fn test_inline_reply_in_standard_space() {
        let chain = vec![from_fn(|_| Flow::Respond("blocked".into()))];
        assert_eq!(
            run(RouteSpace::Standard, &chain).unwrap(),
            PipelineOutcome::Responded(Reply::Text("blocked".into()))
        );
    }

    #[test]
    fn test_api_space_any_result_responds() {
        let chain: Vec<MiddlewareRef> = vec!["reply".into()];
        assert!(matches!(
            run(RouteSpace::Api, &chain).unwrap(),
            PipelineOutcome::Responded(Reply::Json(_))
        ));

        let chain: Vec<MiddlewareRef> = vec!["deny".into()];
        assert_eq!(
            run(RouteSpace::Api, &chain).unwrap(),
            PipelineOutcome::Responded(Reply::Json(Value::Bool(false)))
        );
    }

    #[test]
    fn test_unknown_named_middleware() {
        let chain: Vec<MiddlewareRef> = vec!["nope".into()];
        assert!(matches!(
            run(RouteSpace::Standard, &chain),
            Err(RouterError::UnknownMiddleware(key)) if key == "nope"
        ));
    }
}

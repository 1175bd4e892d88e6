//! Middleware subsystem.
//!
//! # Data Flow
//! ```text
//! Matched route
//!     → global middleware for the route space
//!     → group middleware (outermost group first)
//!     → route middleware
//!     → handler
//! ```
//!
//! # Design Decisions
//! - Named middleware lives in a registry owned by the router, not in global state
//! - Standard space: only `Flow::Halt` from named middleware stops the chain;
//!   inline middleware stops it with `Halt` or `Respond`
//! - Api space: anything other than `Flow::Continue` becomes a JSON error
//!   envelope (status from its `code`, default 400)

pub mod pipeline;
pub mod registry;

use std::fmt;
use std::sync::Arc;

use crate::dispatch::{Reply, RequestContext};

pub use pipeline::{MiddlewarePipeline, PipelineOutcome};
pub use registry::MiddlewareRegistry;

/// What a middleware wants to happen next.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Run the next middleware or the handler.
    Continue,
    /// Abort dispatch; the middleware already wrote whatever response it wants.
    Halt,
    /// Abort dispatch and emit this reply.
    Respond(Reply),
}

/// A middleware function.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, ctx: &mut RequestContext<'_>) -> Flow;
}

impl<F> Middleware for F
where
    F: Fn(&mut RequestContext<'_>) -> Flow + Send + Sync + 'static,
{
    fn handle(&self, ctx: &mut RequestContext<'_>) -> Flow {
        self(ctx)
    }
}

/// Reference to a middleware attached to a route or group.
#[derive(Clone)]
pub enum MiddlewareRef {
    /// Looked up in the [`MiddlewareRegistry`] at dispatch time.
    Named(String),
    Inline(Arc<dyn Middleware>),
}

impl MiddlewareRef {
    /// Wrap a closure as inline middleware.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&mut RequestContext<'_>) -> Flow + Send + Sync + 'static,
    {
        MiddlewareRef::Inline(Arc::new(f))
    }

    pub fn is_named(&self) -> bool {
        matches!(self, MiddlewareRef::Named(_))
    }
}

impl fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareRef::Named(key) => f.debug_tuple("Named").field(key).finish(),
            MiddlewareRef::Inline(_) => f.write_str("Inline(..)"),
        }
    }
}

impl From<&str> for MiddlewareRef {
    fn from(key: &str) -> Self {
        MiddlewareRef::Named(key.to_string())
    }
}

impl From<String> for MiddlewareRef {
    fn from(key: String) -> Self {
        MiddlewareRef::Named(key)
    }
}

/// Shorthand for [`MiddlewareRef::from_fn`].
pub fn from_fn<F>(f: F) -> MiddlewareRef
where
    F: Fn(&mut RequestContext<'_>) -> Flow + Send + Sync + 'static,
{
    MiddlewareRef::from_fn(f)
}

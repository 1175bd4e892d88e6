//! Route handlers and their resolution.
//!
//! # Responsibilities
//! - Represent a handler as a function or a lazily resolved controller action
//! - Build controller instances through the [`Container`]
//! - Invoke the handler with the request context
//!
//! # Design Decisions
//! - Every handler receives the same thing: a [`RequestContext`] holding the
//!   positional path parameters and the request
//! - Controller actions are looked up by name at dispatch time; a missing
//!   controller or action is a 500-class error, never a silent skip
//! - Dependency injection is explicit: types register a constructor or factory

pub mod container;

use std::fmt;
use std::sync::Arc;

use crate::dispatch::{Reply, RequestContext};
use crate::error::RouterError;

pub use container::{Container, Controller, Injectable, Resolver};

/// A function handler.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: &mut RequestContext<'_>) -> Reply;
}

impl<F, R> Handler for F
where
    F: Fn(&mut RequestContext<'_>) -> R + Send + Sync + 'static,
    R: Into<Reply>,
{
    fn call(&self, ctx: &mut RequestContext<'_>) -> Reply {
        self(ctx).into()
    }
}

/// What a route points at.
#[derive(Clone)]
pub enum HandlerRef {
    Function(Arc<dyn Handler>),
    /// A controller action, e.g. `HomeController@index`.
    Bound { class: String, method: String },
}

impl HandlerRef {
    /// Wrap a closure or function.
    pub fn from_fn<F, R>(f: F) -> Self
    where
        F: Fn(&mut RequestContext<'_>) -> R + Send + Sync + 'static,
        R: Into<Reply>,
    {
        HandlerRef::Function(Arc::new(f))
    }

    /// Action `method` of controller `C`.
    pub fn action<C: Controller>(method: &str) -> Self {
        Self::bound(C::NAME, method)
    }

    pub fn bound(class: impl Into<String>, method: impl Into<String>) -> Self {
        HandlerRef::Bound {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Parse a `Controller@action` (or `Controller::action`) descriptor.
    pub fn parse(descriptor: &str) -> Result<Self, RouterError> {
        let (class, method) = descriptor
            .split_once('@')
            .or_else(|| descriptor.split_once("::"))
            .ok_or_else(|| RouterError::InvalidHandler(descriptor.to_string()))?;

        let (class, method) = (class.trim(), method.trim());
        if class.is_empty() || method.is_empty() {
            return Err(RouterError::InvalidHandler(descriptor.to_string()));
        }
        Ok(Self::bound(class, method))
    }

    /// Run the handler.
    pub fn invoke(&self, container: &Container, ctx: &mut RequestContext<'_>) -> Result<Reply, RouterError> {
        match self {
            HandlerRef::Function(handler) => Ok(handler.call(ctx)),
            HandlerRef::Bound { class, method } => container.call_action(class, method, ctx),
        }
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Function(_) => f.write_str("Function(..)"),
            HandlerRef::Bound { class, method } => write!(f, "Bound({class}@{method})"),
        }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Function(_) => f.write_str("Closure"),
            HandlerRef::Bound { class, method } => write!(f, "{class}@{method}"),
        }
    }
}

/// Shorthand for [`HandlerRef::from_fn`].
pub fn from_fn<F, R>(f: F) -> HandlerRef
where
    F: Fn(&mut RequestContext<'_>) -> R + Send + Sync + 'static,
    R: Into<Reply>,
{
    HandlerRef::from_fn(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Request;

    #[test]
    fn test_parse_descriptor() {
        let handler = HandlerRef::parse("HomeController@index").unwrap();
        assert_eq!(handler.to_string(), "HomeController@index");

        let handler = HandlerRef::parse("Reports::daily").unwrap();
        assert_eq!(handler.to_string(), "Reports@daily");

        assert!(matches!(
            HandlerRef::parse("HomeController"),
            Err(RouterError::InvalidHandler(_))
        ));
        assert!(HandlerRef::parse("@index").is_err());
    }

    #[test]
    fn test_function_handler_receives_params() {
        let handler = from_fn(|ctx| format!("Hello, {}", ctx.param(0).unwrap_or("?")));
        let request = Request::new("GET", "/hello/ada");
        let mut ctx = RequestContext::new(&request, vec!["ada".into()]);
        let reply = handler.invoke(&Container::new(), &mut ctx).unwrap();
        assert_eq!(reply, Reply::Text("Hello, ada".into()));
    }
}

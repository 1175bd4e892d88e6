//! Named middleware registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatch::RequestContext;
use crate::middleware::{Flow, Middleware};

/// Maps a key such as `"auth"` to a middleware function.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    entries: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the middleware under `key`.
    pub fn register<F>(&mut self, key: impl Into<String>, middleware: F) -> &mut Self
    where
        F: Fn(&mut RequestContext<'_>) -> Flow + Send + Sync + 'static,
    {
        let key = key.into();
        tracing::debug!(middleware = %key, "Middleware registered");
        self.entries.insert(key, Arc::new(middleware));
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Run the middleware under `key`; `None` if nothing is registered.
    pub fn run(&self, key: &str, ctx: &mut RequestContext<'_>) -> Option<Flow> {
        self.entries.get(key).map(|middleware| middleware.handle(ctx))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

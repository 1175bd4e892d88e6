//! Nested route groups.
//!
//! # Responsibilities
//! - Track the active prefix, pending group name and group middleware
//! - Save and restore frames when groups nest
//!
//! # Design Decisions
//! - Frames form a LIFO stack; leaving restores the parent frame exactly
//! - A new frame inherits only the prefix; name, name prefix and middleware
//!   start empty
//! - Leaving the top level is an error instead of a silent reset

use crate::error::RouterError;
use crate::middleware::MiddlewareRef;

/// One group scope.
#[derive(Debug, Clone, Default)]
pub struct GroupFrame {
    pub prefix: String,
    /// Pending group name; derived route names start with it.
    pub name: String,
    pub middleware: Vec<MiddlewareRef>,
    /// Prepended to every explicit `name()` in this frame.
    pub name_prefix: String,
}

impl GroupFrame {
    /// `path` under this frame's prefix, always with a leading `/`.
    pub fn full_path(&self, path: &str) -> String {
        let joined = format!(
            "{}/{}",
            self.prefix.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        format!("/{}", joined.trim_start_matches('/'))
    }

    /// Route name derived from the group name: `admin.` + `users/list` → `admin.users.list`.
    pub fn derived_name(&self, path: &str) -> Option<String> {
        if self.name.is_empty() {
            return None;
        }
        Some(format!("{}{}", self.name, path.trim_matches('/').replace('/', ".")))
    }
}

/// Stack of group frames.
#[derive(Debug, Default)]
pub struct GroupContext {
    current: GroupFrame,
    stack: Vec<GroupFrame>,
}

impl GroupContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the active frame and start a nested one under `prefix`.
    pub fn enter(&mut self, prefix: &str) {
        let nested = GroupFrame {
            prefix: format!(
                "{}/{}",
                self.current.prefix.trim_end_matches('/'),
                prefix.trim_start_matches('/')
            ),
            ..GroupFrame::default()
        };
        let parent = std::mem::replace(&mut self.current, nested);
        self.stack.push(parent);
    }

    /// Discard the active frame and restore its parent.
    pub fn leave(&mut self) -> Result<(), RouterError> {
        let parent = self.stack.pop().ok_or_else(|| {
            RouterError::UnbalancedGroup("leave_group called outside of any group".into())
        })?;
        self.current = parent;
        Ok(())
    }

    /// Number of open groups; 0 at top level.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current(&self) -> &GroupFrame {
        &self.current
    }

    /// Replace (not extend) the active frame's middleware.
    pub fn set_middleware(&mut self, middleware: Vec<MiddlewareRef>) {
        self.current.middleware = middleware;
    }

    pub fn set_name(&mut self, name: String) {
        self.current.name = name;
    }

    pub fn set_name_prefix(&mut self, prefix: String) {
        self.current.name_prefix = prefix;
    }
}

//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (startup):
//!     Router::get/post/.../api_get(pattern, handler, middleware)
//!     → group.rs (prefix, group middleware, derived names)
//!     → pattern.rs (compile `{param}` placeholders)
//!     → table.rs (per space, per method, registration order)
//!     → names.rs (route names for URL building)
//!
//! Dispatch (per request):
//!     Router::dispatch → dispatch::Dispatcher → table lookups
//! ```
//!
//! # Design Decisions
//! - Exact lookup before pattern matching
//! - Overlapping patterns: first registered wins
//! - A placeholder captures exactly one path segment

pub mod group;
pub mod method;
pub mod names;
pub mod pattern;
pub mod router;
pub mod space;
pub mod table;

pub use group::{GroupContext, GroupFrame};
pub use method::HttpMethod;
pub use names::{RouteNameEntry, RouteNameRegistry, UrlBase};
pub use pattern::PathPattern;
pub use router::{Group, Router};
pub use space::RouteSpace;
pub use table::{Route, RouteTable};

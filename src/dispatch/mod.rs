//! Request dispatch.
//!
//! # Responsibilities
//! - Carry the request and per-request state through middleware and handler
//! - Classify the outcome: handler reply, 400, 404, 405 or a 500-class error
//! - Serialize: raw text for the standard space, JSON for the api space
//!
//! # Design Decisions
//! - Transport-neutral: [`Request`] and [`Response`] know nothing about sockets;
//!   the `http` module adapts them to axum
//! - 400/404/405 are values ([`Rejection`]), not errors

pub mod context;
pub mod dispatcher;
pub mod rejection;
pub mod reply;
pub mod request;

pub use context::RequestContext;
pub use dispatcher::Dispatcher;
pub use rejection::Rejection;
pub use reply::{Reply, Response};
pub use request::Request;

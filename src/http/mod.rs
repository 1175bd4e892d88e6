//! HTTP hosting adapter.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum, request id, tracing, timeout, body limit)
//!     → request.rs (axum request → dispatch::Request, form body decoded)
//!     → Router::dispatch on the blocking pool
//!     → response.rs (dispatch::Response → axum response, 500 mapping)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - The router is synchronous; dispatch runs under `spawn_blocking` so a slow
//!   handler never stalls the async workers
//! - The timeout bounds handlers that never return
//! - 500-class errors are logged in full and answered with a generic body

pub mod request;
pub mod response;
pub mod server;

pub use request::{into_core_request, RequestError, X_REQUEST_ID};
pub use server::{AppState, HttpServer};

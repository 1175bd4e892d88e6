//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registration and dispatch produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`method`, `path`, `space`, `status`) on every dispatch event
//! - `RUST_LOG` overrides the configured level
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;

pub use logging::init_logging;

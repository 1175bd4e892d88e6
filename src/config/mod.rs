//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CraftConfig (validated, immutable)
//!     → lifecycle::startup builds the Router from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CraftConfig, ObservabilityConfig, RouteConfig, SecurityConfig, SelfTestConfig, ServerConfig,
    UrlConfig,
};
pub use validation::{validate_config, ValidationError};

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overlay (API_URL, PRODUCTION_API_URL)
//!     → validation.rs (semantic checks)
//!     → MonitorConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Endpoints are fixed for the lifetime of the process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_with_env, ConfigError};
pub use schema::{
    EndpointsConfig, HealthCheckConfig, ListenerConfig, MonitorConfig, ObservabilityConfig,
};

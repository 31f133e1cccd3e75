//! Endpoint health monitor with automatic failover.
//!
//! Picks the first healthy backend among a primary and an optional fallback,
//! re-checks on a timer, and holds re-checks off while the consumer is busy.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::MonitorConfig;
pub use health::{EndpointSelector, SelectionState, Status};
pub use http::StatusServer;
pub use lifecycle::Shutdown;

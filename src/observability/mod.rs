//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! probe.rs, selector.rs, monitor.rs produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;

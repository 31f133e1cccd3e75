//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the endpoint monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Candidate backend endpoints.
    pub endpoints: EndpointsConfig,

    /// Probe and scheduling settings.
    pub health_check: HealthCheckConfig,

    /// Status surface listener.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Candidate endpoint URLs, in priority order.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Primary backend base URL (e.g., "http://localhost:8080"). Required.
    pub primary_url: String,

    /// Production backend used when the primary is unhealthy.
    pub fallback_url: Option<String>,
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Interval between scheduled evaluation cycles in seconds.
    pub interval_secs: u64,

    /// Hard timeout for a single probe in milliseconds.
    pub timeout_ms: u64,

    /// Path appended to each endpoint URL.
    pub path: String,

    /// Value of the `status` field that marks a healthy response.
    pub healthy_marker: String,

    /// Route probes through proxies from `HTTP_PROXY`/`HTTPS_PROXY`.
    pub use_system_proxy: bool,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            timeout_ms: 5000,
            path: "/health".to_string(),
            healthy_marker: "healthy".to_string(),
            use_system_proxy: true,
        }
    }
}

/// Listener configuration for the status API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Enable the status API.
    pub enabled: bool,

    /// Bind address (e.g., "127.0.0.1:8090").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8090".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

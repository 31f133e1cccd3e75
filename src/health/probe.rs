//! Single-endpoint health probe.
//!
//! # Responsibilities
//! - Issue one bounded-time GET against an endpoint's health route
//! - Classify the outcome into healthy / error kind
//!
//! # Design Decisions
//! - Every failure is a value, never an error: `probe` always returns a `ProbeResult`
//! - The whole exchange (connect, headers, body) shares one deadline
//! - The status code decides `ServerError` as soon as headers arrive
//! - Bodies above `MAX_BODY_BYTES` are rejected, not buffered
//! - Dropping the request future on timeout cancels the transport

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{self, Instant};

use crate::config::HealthCheckConfig;
use crate::health::endpoint::Endpoint;
use crate::observability::metrics;

/// Largest health response body accepted.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Upper bound on reading a non-success body for diagnostics.
const DETAILS_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
enum BodyError {
    #[error("health response body exceeds {} bytes", MAX_BODY_BYTES)]
    TooLarge,

    #[error("failed to read health response body: {0}")]
    Transport(reqwest::Error),
}

/// Why a probe classified an endpoint as unhealthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No complete response within the probe timeout.
    Timeout,
    /// Transport failure before any response was received.
    NetworkUnreachable,
    /// A response arrived with a non-success status code.
    ServerError(u16),
    /// A success response whose body is malformed or not marked healthy.
    ProtocolError,
}

impl ErrorKind {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::NetworkUnreachable => "network_unreachable",
            ErrorKind::ServerError(_) => "server_error",
            ErrorKind::ProtocolError => "protocol_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Timeout => f.write_str("Connection timed out"),
            ErrorKind::NetworkUnreachable => f.write_str("No response from server"),
            ErrorKind::ServerError(code) => write!(f, "Server error: {}", code),
            ErrorKind::ProtocolError => f.write_str("Server is not responding properly"),
        }
    }
}

/// Outcome of a single probe.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub endpoint: Endpoint,
    pub healthy: bool,
    pub error_kind: Option<ErrorKind>,
    /// Parsed response body, or transport error details, for diagnostics.
    pub details: Option<Value>,
    pub latency: Duration,
}

impl ProbeResult {
    pub fn healthy(endpoint: Endpoint, details: Option<Value>, latency: Duration) -> Self {
        Self {
            endpoint,
            healthy: true,
            error_kind: None,
            details,
            latency,
        }
    }

    pub fn unhealthy(
        endpoint: Endpoint,
        kind: ErrorKind,
        details: Option<Value>,
        latency: Duration,
    ) -> Self {
        Self {
            endpoint,
            healthy: false,
            error_kind: Some(kind),
            details,
            latency,
        }
    }
}

/// A reachability check against one endpoint.
///
/// Implementations must not panic or block, and must bound their own duration.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult;
}

/// HTTP `GET {url}/health` probe.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    timeout: Duration,
    path: String,
    healthy_marker: String,
}

impl HttpProbe {
    pub fn new(config: &HealthCheckConfig) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("endpoint-failover/", env!("CARGO_PKG_VERSION")));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            timeout: Duration::from_millis(config.timeout_ms),
            path: config.path.clone(),
            healthy_marker: config.healthy_marker.clone(),
        })
    }

    /// Read at most `MAX_BODY_BYTES` of the body.
    async fn read_body(mut response: reqwest::Response) -> Result<Vec<u8>, BodyError> {
        if response.content_length().is_some_and(|len| len > MAX_BODY_BYTES as u64) {
            return Err(BodyError::TooLarge);
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(BodyError::Transport)? {
            if body.len() + chunk.len() > MAX_BODY_BYTES {
                return Err(BodyError::TooLarge);
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    /// Classify once headers are in. Non-success statuses stay `ServerError`
    /// whatever happens to the body; it is only read for `details`.
    async fn finish(
        &self,
        endpoint: &Endpoint,
        response: reqwest::Response,
        started: Instant,
        deadline: Instant,
    ) -> ProbeResult {
        let status = response.status();
        let remaining = deadline.saturating_duration_since(Instant::now());

        if !status.is_success() {
            let body = time::timeout(remaining.min(DETAILS_GRACE), Self::read_body(response))
                .await
                .ok()
                .and_then(Result::ok)
                .unwrap_or_default();
            return self.classify(endpoint, status, &body, started.elapsed());
        }

        match time::timeout_at(deadline, Self::read_body(response)).await {
            Ok(Ok(body)) => self.classify(endpoint, status, &body, started.elapsed()),
            Ok(Err(BodyError::Transport(e))) if e.is_timeout() => {
                ProbeResult::unhealthy(endpoint.clone(), ErrorKind::Timeout, None, started.elapsed())
            }
            Ok(Err(e)) => ProbeResult::unhealthy(
                endpoint.clone(),
                ErrorKind::ProtocolError,
                Some(serde_json::json!({ "error": e.to_string() })),
                started.elapsed(),
            ),
            Err(_) => {
                ProbeResult::unhealthy(endpoint.clone(), ErrorKind::Timeout, None, started.elapsed())
            }
        }
    }

    fn classify(&self, endpoint: &Endpoint, status: StatusCode, body: &[u8], latency: Duration) -> ProbeResult {
        let parsed: Option<Value> = serde_json::from_slice(body).ok();

        if !status.is_success() {
            return ProbeResult::unhealthy(
                endpoint.clone(),
                ErrorKind::ServerError(status.as_u16()),
                parsed,
                latency,
            );
        }

        match parsed {
            Some(value) if payload_is_healthy(&value, &self.healthy_marker) => {
                ProbeResult::healthy(endpoint.clone(), Some(value), latency)
            }
            other => ProbeResult::unhealthy(endpoint.clone(), ErrorKind::ProtocolError, other, latency),
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        let url = endpoint.health_url(&self.path);
        let started = Instant::now();
        let deadline = started + self.timeout;

        let result = match time::timeout_at(deadline, self.client.get(&url).send()).await {
            Ok(Ok(response)) => self.finish(endpoint, response, started, deadline).await,
            Ok(Err(e)) => {
                let kind = if e.is_timeout() {
                    ErrorKind::Timeout
                } else {
                    ErrorKind::NetworkUnreachable
                };
                let details = serde_json::json!({ "error": e.to_string() });
                ProbeResult::unhealthy(endpoint.clone(), kind, Some(details), started.elapsed())
            }
            Err(_) => ProbeResult::unhealthy(
                endpoint.clone(),
                ErrorKind::Timeout,
                None,
                started.elapsed(),
            ),
        };

        match result.error_kind {
            None => tracing::debug!(
                url = %url,
                latency_ms = result.latency.as_millis() as u64,
                "Health probe succeeded"
            ),
            Some(kind) => tracing::warn!(
                url = %url,
                reason = %kind,
                latency_ms = result.latency.as_millis() as u64,
                "Health probe failed"
            ),
        }
        metrics::record_probe(&result);

        result
    }
}

/// A JSON object is healthy when its `status` field is absent or equals the marker.
pub fn payload_is_healthy(payload: &Value, marker: &str) -> bool {
    match payload.as_object() {
        Some(obj) => match obj.get("status") {
            None => true,
            Some(status) => status.as_str() == Some(marker),
        },
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_marker() {
        assert!(payload_is_healthy(&json!({"status": "healthy"}), "healthy"));
        assert!(payload_is_healthy(&json!({"status": "healthy", "version": 2}), "healthy"));
        assert!(payload_is_healthy(&json!({"uptime": 12}), "healthy"));
        assert!(!payload_is_healthy(&json!({"status": "degraded"}), "healthy"));
        assert!(!payload_is_healthy(&json!({"status": true}), "healthy"));
        assert!(!payload_is_healthy(&json!(["healthy"]), "healthy"));
        assert!(!payload_is_healthy(&json!("healthy"), "healthy"));
    }

    #[test]
    fn test_error_kind_messages() {
        assert_eq!(ErrorKind::Timeout.to_string(), "Connection timed out");
        assert_eq!(ErrorKind::NetworkUnreachable.to_string(), "No response from server");
        assert_eq!(ErrorKind::ServerError(500).to_string(), "Server error: 500");
        assert_eq!(
            ErrorKind::ProtocolError.to_string(),
            "Server is not responding properly"
        );
        assert_eq!(ErrorKind::ServerError(503).as_str(), "server_error");
    }

    #[test]
    fn test_classify() {
        let probe = HttpProbe::new(&HealthCheckConfig::default()).unwrap();
        let ep = Endpoint::parse("http://local:8080", crate::health::Role::Primary).unwrap();
        let latency = Duration::from_millis(3);

        let ok = probe.classify(&ep, StatusCode::OK, br#"{"status":"healthy"}"#, latency);
        assert!(ok.healthy);
        assert!(ok.error_kind.is_none());

        let bad = probe.classify(&ep, StatusCode::INTERNAL_SERVER_ERROR, br#"{"status":"healthy"}"#, latency);
        assert!(!bad.healthy);
        assert_eq!(bad.error_kind, Some(ErrorKind::ServerError(500)));

        let garbled = probe.classify(&ep, StatusCode::OK, b"<html>ok</html>", latency);
        assert_eq!(garbled.error_kind, Some(ErrorKind::ProtocolError));
        assert!(garbled.details.is_none());

        let wrong = probe.classify(&ep, StatusCode::OK, br#"{"status":"starting"}"#, latency);
        assert_eq!(wrong.error_kind, Some(ErrorKind::ProtocolError));
        assert!(wrong.details.is_some());
    }
}

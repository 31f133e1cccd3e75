//! Startup orchestration.
//!
//! Builds the monitor from a validated configuration and spawns its driver.
//! Must be called from within a Tokio runtime.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::validation::ValidationError;
use crate::config::MonitorConfig;
use crate::health::{
    candidates_from_config, EndpointSelector, HttpProbe, Monitor, MonitorHandle, SelectorError,
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid endpoint configuration: {0}")]
    Endpoints(#[from] ValidationError),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("failed to build health check client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A started monitor: the shared selector plus its driver.
#[derive(Debug)]
pub struct Running {
    pub selector: Arc<EndpointSelector>,
    pub monitor: MonitorHandle,
}

/// Build the selector with the HTTP probe, without starting the timer.
pub fn build_selector(config: &MonitorConfig) -> Result<Arc<EndpointSelector>, StartupError> {
    let candidates = candidates_from_config(&config.endpoints)?;
    let probe = Arc::new(HttpProbe::new(&config.health_check)?);

    for endpoint in &candidates {
        tracing::info!(url = %endpoint, role = ?endpoint.role(), "Configured endpoint");
    }

    Ok(Arc::new(EndpointSelector::new(candidates, probe)?))
}

/// Build the selector and spawn its recurring driver.
pub fn start(config: &MonitorConfig) -> Result<Running, StartupError> {
    let selector = build_selector(config)?;
    let monitor = Monitor::new(
        selector.clone(),
        Duration::from_secs(config.health_check.interval_secs),
    )
    .spawn();

    Ok(Running { selector, monitor })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_selector_from_config() {
        let mut config = MonitorConfig::default();
        config.endpoints.primary_url = "http://127.0.0.1:1".into();
        config.endpoints.fallback_url = Some("https://prod.example.com".into());

        let selector = build_selector(&config).unwrap();
        assert_eq!(selector.candidates().len(), 2);
        assert_eq!(selector.active_url(), "http://127.0.0.1:1");
    }

    #[tokio::test]
    async fn test_missing_primary_fails() {
        let config = MonitorConfig::default();
        assert!(matches!(
            build_selector(&config).unwrap_err(),
            StartupError::Endpoints(ValidationError::MissingPrimary)
        ));
    }
}

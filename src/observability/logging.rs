//! Structured logging.
//!
//! `RUST_LOG` wins over the configured level when set.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Default filter directive for a configured log level.
pub fn default_directive(config: &ObservabilityConfig) -> String {
    format!(
        "endpoint_failover={level},tower_http={level}",
        level = config.log_level
    )
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(config).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        let mut config = ObservabilityConfig::default();
        config.log_level = "debug".into();
        assert_eq!(
            default_directive(&config),
            "endpoint_failover=debug,tower_http=debug"
        );
        assert!(default_directive(&config).parse::<EnvFilter>().is_ok());
    }
}

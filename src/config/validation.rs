//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check endpoint URLs parse and use http(s)
//! - Validate value ranges (timeouts > 0, interval > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::MonitorConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("primary endpoint URL is not set")]
    MissingPrimary,

    #[error("{field} is not a valid URL '{value}': {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field} must use http or https, got '{scheme}'")]
    UnsupportedScheme { field: &'static str, scheme: String },

    #[error("fallback URL must differ from the primary URL")]
    DuplicateEndpoint,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("health check path must start with '/', got '{0}'")]
    InvalidPath(String),

    #[error("{field} is not a valid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a loaded configuration.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let primary = config.endpoints.primary_url.trim();
    let primary_url = if primary.is_empty() {
        errors.push(ValidationError::MissingPrimary);
        None
    } else {
        check_url("endpoints.primary_url", primary, &mut errors)
    };

    if let Some(fallback) = config.endpoints.fallback_url.as_deref().map(str::trim) {
        if !fallback.is_empty() {
            let fallback_url = check_url("endpoints.fallback_url", fallback, &mut errors);
            if let (Some(p), Some(f)) = (&primary_url, &fallback_url) {
                if p == f {
                    errors.push(ValidationError::DuplicateEndpoint);
                }
            }
        }
    }

    let health = &config.health_check;
    if health.interval_secs == 0 {
        errors.push(ValidationError::Zero("health_check.interval_secs"));
    }
    if health.timeout_ms == 0 {
        errors.push(ValidationError::Zero("health_check.timeout_ms"));
    }
    if !health.path.starts_with('/') {
        errors.push(ValidationError::InvalidPath(health.path.clone()));
    }

    if config.listener.enabled
        && config.listener.bind_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) -> Option<Url> {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        Ok(url) => {
            errors.push(ValidationError::UnsupportedScheme {
                field,
                scheme: url.scheme().to_string(),
            });
            None
        }
        Err(e) => {
            errors.push(ValidationError::InvalidUrl {
                field,
                value: value.to_string(),
                reason: e.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> MonitorConfig {
        let mut config = MonitorConfig::default();
        config.endpoints.primary_url = "http://localhost:8080".into();
        config.endpoints.fallback_url = Some("https://prod.example.com".into());
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_missing_primary() {
        let mut config = valid();
        config.endpoints.primary_url = "  ".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingPrimary]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.endpoints.fallback_url = Some("ftp://prod".into());
        config.health_check.interval_secs = 0;
        config.health_check.timeout_ms = 0;
        config.health_check.path = "health".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ValidationError::UnsupportedScheme { .. }));
    }

    #[test]
    fn test_duplicate_fallback() {
        let mut config = valid();
        config.endpoints.fallback_url = Some("http://localhost:8080/".into());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicateEndpoint]);
    }

    #[test]
    fn test_empty_fallback_is_single_candidate() {
        let mut config = valid();
        config.endpoints.fallback_url = Some(String::new());
        assert!(validate_config(&config).is_ok());
    }
}

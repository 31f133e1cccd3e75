//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::MonitorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the primary endpoint URL.
pub const ENV_PRIMARY_URL: &str = "API_URL";
/// Environment variable holding the production fallback URL.
pub const ENV_FALLBACK_URL: &str = "PRODUCTION_API_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional file, overlay the process environment,
/// then validate.
pub fn load_with_env(path: Option<&Path>) -> Result<MonitorConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => MonitorConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay endpoint URLs from the environment.
///
/// An empty `PRODUCTION_API_URL` clears the fallback.
pub fn apply_env_overrides<F>(config: &mut MonitorConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(primary) = lookup(ENV_PRIMARY_URL) {
        config.endpoints.primary_url = primary;
    }
    if let Some(fallback) = lookup(ENV_FALLBACK_URL) {
        config.endpoints.fallback_url = if fallback.trim().is_empty() {
            None
        } else {
            Some(fallback)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_minimal_toml() {
        let config: MonitorConfig = toml::from_str(
            r#"
            [endpoints]
            primary_url = "http://localhost:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.endpoints.primary_url, "http://localhost:8080");
        assert!(config.endpoints.fallback_url.is_none());
        assert_eq!(config.health_check.interval_secs, 30);
        assert_eq!(config.health_check.timeout_ms, 5000);
        assert_eq!(config.health_check.path, "/health");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_PRIMARY_URL, "http://local:8080"),
            (ENV_FALLBACK_URL, "https://prod"),
        ]
        .into_iter()
        .collect();

        let mut config = MonitorConfig::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.endpoints.primary_url, "http://local:8080");
        assert_eq!(config.endpoints.fallback_url.as_deref(), Some("https://prod"));
    }

    #[test]
    fn test_empty_env_fallback_clears() {
        let mut config = MonitorConfig::default();
        config.endpoints.fallback_url = Some("https://prod".into());
        apply_env_overrides(&mut config, |k| {
            (k == ENV_FALLBACK_URL).then(String::new)
        });
        assert!(config.endpoints.fallback_url.is_none());
    }

    #[test]
    fn test_missing_file() {
        let err = load_with_env(Some(Path::new("/nonexistent/monitor.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

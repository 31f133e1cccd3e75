//! Candidate endpoint abstraction.
//!
//! # Responsibilities
//! - Represent a single backend base URL and its priority role
//! - Build the ordered candidate list from configuration

use serde::Serialize;
use std::fmt;
use url::Url;

use crate::config::EndpointsConfig;
use crate::config::validation::ValidationError;

/// Priority role of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Primary,
    Fallback,
}

/// A candidate backend base URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    url: Url,
    role: Role,
}

impl Endpoint {
    pub fn new(url: Url, role: Role) -> Self {
        Self { url, role }
    }

    /// Parse a base URL for the given role.
    pub fn parse(url: &str, role: Role) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url.trim())?, role))
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_fallback(&self) -> bool {
        self.role == Role::Fallback
    }

    /// The base URL as consumers expect it, without a trailing slash.
    pub fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }

    /// URL of the health route under this endpoint.
    ///
    /// `path` is appended to the base path, so `https://host/api` with
    /// `/health` probes `https://host/api/health`.
    pub fn health_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url())
    }
}

/// Build the ordered candidate list (primary first) from configuration.
///
/// A missing or blank fallback yields single-candidate mode.
pub fn candidates_from_config(config: &EndpointsConfig) -> Result<Vec<Endpoint>, ValidationError> {
    let parse = |field: &'static str, value: &str, role: Role| {
        Endpoint::parse(value, role).map_err(|e| ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        })
    };

    if config.primary_url.trim().is_empty() {
        return Err(ValidationError::MissingPrimary);
    }

    let mut candidates = vec![parse("endpoints.primary_url", &config.primary_url, Role::Primary)?];
    if let Some(fallback) = config.fallback_url.as_deref().filter(|f| !f.trim().is_empty()) {
        candidates.push(parse("endpoints.fallback_url", fallback, Role::Fallback)?);
    }
    Ok(candidates)
}

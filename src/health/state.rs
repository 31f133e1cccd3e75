//! Endpoint selection state.
//!
//! # States
//! - Checking: no evaluation cycle has completed yet
//! - Online: the active endpoint answered its last probe healthy
//! - Offline: every candidate failed the last cycle
//!
//! # State Transitions
//! ```text
//! Checking → Online | Offline: first completed cycle
//! Online ←→ Offline: any later cycle (never back to Checking)
//! ```
//!
//! # Design Decisions
//! - Fallback use is reported as Online; `using_fallback` carries the detail
//! - The active endpoint survives an Offline cycle unchanged

use serde::Serialize;

use crate::health::endpoint::Endpoint;

/// Aggregate reachability as seen by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Checking,
    Online,
    Offline,
}

/// Process-wide selection, owned by the `EndpointSelector`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub active_endpoint: Endpoint,
    pub status: Status,
    pub using_fallback: bool,
    pub is_loading: bool,
    pub is_busy: bool,
}

impl SelectionState {
    /// Cold-start state: optimistic primary, still checking.
    pub fn initial(primary: Endpoint) -> Self {
        Self {
            active_endpoint: primary,
            status: Status::Checking,
            using_fallback: false,
            is_loading: true,
            is_busy: false,
        }
    }

    pub fn active_url(&self) -> String {
        self.active_endpoint.base_url()
    }
}

/// Serialized view published to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub active_url: String,
    pub status: Status,
    pub using_fallback: bool,
    pub is_loading: bool,
    pub is_busy: bool,
    pub primary_url: String,
    pub fallback_url: Option<String>,
}

impl StatusSnapshot {
    pub fn new(state: &SelectionState, candidates: &[Endpoint]) -> Self {
        Self {
            active_url: state.active_url(),
            status: state.status,
            using_fallback: state.using_fallback,
            is_loading: state.is_loading,
            is_busy: state.is_busy,
            primary_url: candidates
                .first()
                .map(Endpoint::base_url)
                .unwrap_or_default(),
            fallback_url: candidates.iter().find(|e| e.is_fallback()).map(Endpoint::base_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::Role;

    #[test]
    fn test_snapshot_json_shape() {
        let primary = Endpoint::parse("http://local:8080", Role::Primary).unwrap();
        let fallback = Endpoint::parse("https://prod", Role::Fallback).unwrap();
        let state = SelectionState::initial(primary.clone());

        let snapshot = StatusSnapshot::new(&state, &[primary, fallback]);
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["activeUrl"], "http://local:8080");
        assert_eq!(json["status"], "checking");
        assert_eq!(json["usingFallback"], false);
        assert_eq!(json["isLoading"], true);
        assert_eq!(json["primaryUrl"], "http://local:8080");
        assert_eq!(json["fallbackUrl"], "https://prod");
    }
}

//! Endpoint selection with automatic failover.
//!
//! # Responsibilities
//! - Probe candidates in priority order and pick the first healthy one
//! - Own the process-wide `SelectionState` and publish changes to subscribers
//! - Suppress scheduled re-evaluation while the consumer is busy
//! - Serialize evaluation cycles so no two cycles write concurrently

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex};

use crate::health::endpoint::{Endpoint, Role};
use crate::health::probe::{Probe, ProbeResult};
use crate::health::state::{SelectionState, Status, StatusSnapshot};
use crate::observability::metrics;

/// What started an evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Timer tick. Skipped while busy or while another cycle is in flight.
    Scheduled,
    /// Explicit re-check. Waits for any in-flight cycle and ignores busy.
    Manual,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("at least one candidate endpoint is required")]
    NoCandidates,

    #[error("candidate {index} ({url}) has role {role:?}; expected primary first and fallbacks after")]
    MisorderedCandidates { index: usize, url: String, role: Role },
}

/// Chooses the active endpoint among an ordered candidate list.
pub struct EndpointSelector {
    candidates: Vec<Endpoint>,
    probe: Arc<dyn Probe>,
    busy: AtomicBool,
    cycle: Mutex<()>,
    state: watch::Sender<SelectionState>,
}

impl EndpointSelector {
    /// Create a selector over `candidates` (primary first).
    pub fn new(candidates: Vec<Endpoint>, probe: Arc<dyn Probe>) -> Result<Self, SelectorError> {
        let primary = candidates.first().ok_or(SelectorError::NoCandidates)?.clone();

        for (index, endpoint) in candidates.iter().enumerate() {
            let expected = if index == 0 { Role::Primary } else { Role::Fallback };
            if endpoint.role() != expected {
                return Err(SelectorError::MisorderedCandidates {
                    index,
                    url: endpoint.base_url(),
                    role: endpoint.role(),
                });
            }
        }

        let (state, _) = watch::channel(SelectionState::initial(primary));

        Ok(Self {
            candidates,
            probe,
            busy: AtomicBool::new(false),
            cycle: Mutex::new(()),
            state,
        })
    }

    pub fn candidates(&self) -> &[Endpoint] {
        &self.candidates
    }

    /// Current selection.
    pub fn state(&self) -> SelectionState {
        self.state.borrow().clone()
    }

    /// Current selection in the shape the UI layer consumes.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot::new(&self.state.borrow(), &self.candidates)
    }

    /// Base URL of the endpoint all outgoing requests should target.
    pub fn active_url(&self) -> String {
        self.state.borrow().active_url()
    }

    /// Receive every published change. Drop the receiver to unsubscribe.
    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.state.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Declare (or clear) a long-running operation against the active endpoint.
    ///
    /// A cycle already in flight finishes with the value it observed at start.
    pub fn set_processing(&self, processing: bool) {
        let mut previous = processing;

        // The flag is swapped under the watch lock so it never disagrees
        // with the published `is_busy`.
        self.state.send_if_modified(|state| {
            previous = self.busy.swap(processing, Ordering::SeqCst);
            let changed = state.is_busy != processing;
            state.is_busy = processing;
            changed
        });

        if previous != processing {
            tracing::debug!(processing, "Processing flag changed");
        }
    }

    /// Mark the selector busy until the returned guard is dropped.
    pub fn begin_processing(self: &Arc<Self>) -> ProcessingGuard {
        self.set_processing(true);
        ProcessingGuard {
            selector: self.clone(),
        }
    }

    /// Run one evaluation cycle and return the resulting state.
    pub async fn evaluate(&self, trigger: Trigger) -> SelectionState {
        let _cycle = match trigger {
            Trigger::Scheduled => match self.cycle.try_lock() {
                Ok(guard) => guard,
                Err(_) => {
                    tracing::debug!("Evaluation already in flight, skipping tick");
                    metrics::record_cycle("overlap_skipped");
                    return self.state();
                }
            },
            Trigger::Manual => self.cycle.lock().await,
        };

        if trigger == Trigger::Scheduled && self.busy.load(Ordering::SeqCst) {
            tracing::debug!("Processing in progress, skipping scheduled health check");
            metrics::record_cycle("busy_skipped");
            return self.state();
        }

        let selected = self.first_healthy().await;
        self.apply(selected.as_ref());
        self.state()
    }

    /// Probe candidates in order, stopping at the first healthy one.
    async fn first_healthy(&self) -> Option<ProbeResult> {
        let mut primary_failure: Option<ProbeResult> = None;

        for endpoint in &self.candidates {
            let result = self.probe.probe(endpoint).await;
            if result.healthy {
                if let Some(failed) = &primary_failure {
                    tracing::info!(
                        url = %result.endpoint,
                        primary = %failed.endpoint,
                        primary_error = ?failed.error_kind,
                        "Using fallback server"
                    );
                }
                return Some(result);
            }

            if endpoint.role() == Role::Primary && self.candidates.len() > 1 {
                tracing::info!(url = %endpoint, "Primary server offline, trying fallback servers");
                primary_failure = Some(result);
            }
        }

        tracing::warn!(candidates = self.candidates.len(), "All API servers are offline");
        None
    }

    fn apply(&self, selected: Option<&ProbeResult>) {
        let mut transition = None;

        self.state.send_if_modified(|state| {
            let before = state.clone();

            match selected {
                Some(result) => {
                    state.active_endpoint = result.endpoint.clone();
                    state.using_fallback = result.endpoint.is_fallback();
                    state.status = Status::Online;
                }
                None => state.status = Status::Offline,
            }
            state.is_loading = false;

            let changed = *state != before;
            if before.status != state.status || before.active_endpoint != state.active_endpoint {
                transition = Some((before.status, state.status));
            }
            changed
        });

        if let Some((from, to)) = transition {
            tracing::info!(
                from = ?from,
                to = ?to,
                active_url = %self.active_url(),
                "Endpoint selection changed"
            );
        }
        metrics::record_cycle(if selected.is_some() { "online" } else { "offline" });
    }
}

impl std::fmt::Debug for EndpointSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointSelector")
            .field("candidates", &self.candidates)
            .field("busy", &self.is_busy())
            .field("state", &*self.state.borrow())
            .finish()
    }
}

/// RAII guard that clears the processing flag on drop.
#[derive(Debug)]
pub struct ProcessingGuard {
    selector: Arc<EndpointSelector>,
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.selector.set_processing(false);
    }
}

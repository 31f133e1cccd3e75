//! Recurring evaluation driver.
//!
//! # Responsibilities
//! - Run one evaluation cycle immediately on startup
//! - Re-evaluate on a fixed interval for the lifetime of the owning scope
//! - Stop cleanly: no cycle writes state after `stop` returns

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::health::selector::{EndpointSelector, Trigger};
use crate::lifecycle::Shutdown;

/// Periodically drives an `EndpointSelector`.
pub struct Monitor {
    selector: Arc<EndpointSelector>,
    interval: Duration,
}

impl Monitor {
    pub fn new(selector: Arc<EndpointSelector>, interval: Duration) -> Self {
        Self { selector, interval }
    }

    /// Spawn the driver on the current runtime.
    pub fn spawn(self) -> MonitorHandle {
        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        let task = tokio::spawn(self.run(receiver));

        MonitorHandle {
            shutdown,
            task: Some(task),
        }
    }

    /// Run until `shutdown` fires.
    ///
    /// The startup cycle is a manual one so cold start completes even if the
    /// consumer is already busy. Ticks missed while a cycle runs are skipped.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            candidates = self.selector.candidates().len(),
            "Endpoint monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut trigger = Trigger::Manual;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                _ = ticker.tick() => {}
            }

            // A cycle dropped here has not published anything yet.
            tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                _ = self.selector.evaluate(trigger) => {}
            }
            trigger = Trigger::Scheduled;
        }

        tracing::info!("Endpoint monitor received shutdown signal, exiting loop");
    }
}

/// Owner of a spawned `Monitor`. Dropping it aborts the driver.
#[derive(Debug)]
pub struct MonitorHandle {
    shutdown: Shutdown,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the driver and wait for it to exit. Safe to call repeatedly.
    pub async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        self.shutdown.trigger();
        if let Err(e) = task.await {
            if !e.is_cancelled() {
                tracing::error!(error = %e, "Endpoint monitor task failed");
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

//! Status API for the upload UI.
//!
//! # Routes
//! - `GET /status`: current `StatusSnapshot`
//! - `PUT /processing`: `{"processing": bool}` sets or clears the busy flag
//! - `POST /recheck`: run a manual evaluation cycle, return the new snapshot
//! - `GET /health`: liveness of this service itself

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::health::{EndpointSelector, StatusSnapshot, Trigger};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub selector: Arc<EndpointSelector>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessingRequest {
    pub processing: bool,
}

/// HTTP server exposing the selection state.
pub struct StatusServer {
    router: Router,
}

impl StatusServer {
    pub fn new(selector: Arc<EndpointSelector>) -> Self {
        Self {
            router: Self::build_router(AppState { selector }),
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/status", get(get_status))
            .route("/processing", put(put_processing))
            .route("/recheck", post(post_recheck))
            .route("/health", get(get_health))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Status API listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Status API stopped");
        Ok(())
    }
}

async fn get_status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.selector.snapshot())
}

async fn put_processing(
    State(state): State<AppState>,
    Json(request): Json<ProcessingRequest>,
) -> Json<StatusSnapshot> {
    state.selector.set_processing(request.processing);
    Json(state.selector.snapshot())
}

async fn post_recheck(State(state): State<AppState>) -> Json<StatusSnapshot> {
    state.selector.evaluate(Trigger::Manual).await;
    Json(state.selector.snapshot())
}

async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

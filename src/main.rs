//! Endpoint failover daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!                 │               ENDPOINT MONITOR               │
//!                 │                                              │
//!   UI layer      │  ┌──────────┐      ┌──────────────────┐      │     Primary
//!   ──────────────┼─▶│  status  │─────▶│ EndpointSelector │──────┼───▶ /health
//!   GET /status   │  │   API    │      │  (SelectionState)│      │
//!   PUT /process. │  └──────────┘      └────────┬─────────┘      │     Fallback
//!                 │                             │ HealthProbe    ├───▶ /health
//!                 │                    ┌────────┴─────────┐      │
//!                 │                    │ Monitor (30s tick)│     │
//!                 │                    └──────────────────┘      │
//!                 └──────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use endpoint_failover::config::load_with_env;
use endpoint_failover::lifecycle::{self, signals, Running, Shutdown};
use endpoint_failover::observability::{logging, metrics};
use endpoint_failover::StatusServer;

#[derive(Parser)]
#[command(name = "endpoint-failover")]
#[command(about = "Health monitor with automatic failover between a primary and a fallback backend", long_about = None)]
struct Cli {
    /// TOML configuration file. API_URL / PRODUCTION_API_URL override its endpoints.
    #[arg(short, long, env = "MONITOR_CONFIG")]
    config: Option<PathBuf>,

    /// Status API bind address, overriding the configuration.
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_with_env(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind.to_string();
    }

    logging::init_logging(&config.observability);
    tracing::info!("endpoint-failover v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        primary = %config.endpoints.primary_url,
        fallback = ?config.endpoints.fallback_url,
        interval_secs = config.health_check.interval_secs,
        timeout_ms = config.health_check.timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let Running {
        selector,
        mut monitor,
    } = lifecycle::start(&config)?;

    let shutdown = Shutdown::new();
    let server_task = if config.listener.enabled {
        let listener = TcpListener::bind(&config.listener.bind_address)
            .await
            .with_context(|| format!("Failed to bind {}", config.listener.bind_address))?;
        let server = StatusServer::new(selector.clone());
        let server_shutdown = shutdown.subscribe();
        Some(tokio::spawn(async move {
            server.run(listener, server_shutdown).await
        }))
    } else {
        None
    };

    signals::wait_for_shutdown().await;
    shutdown.trigger();

    if let Some(task) = server_task {
        if let Err(e) = task.await? {
            tracing::error!(error = %e, "Status API exited with error");
        }
    }
    monitor.stop().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

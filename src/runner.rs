//! Probe loop setup and lifecycle.
//!
//! Drives the probe schedule with:
//! - One attempt in flight at a time, separated by the configured interval
//! - Graceful shutdown that interrupts the sleep but never an attempt
//! - A bounded flush of the span pipeline before returning

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::config::Config;
use crate::observability::telemetry::Telemetry;
use crate::probe::{HttpProbe, SpanEmitter};

/// One schedulable probe attempt.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Run attempt number `attempt` (1-based) to completion.
    async fn probe(&self, attempt: u64);
}

/// Loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    ShuttingDown,
}

/// Runs a [`Probe`] on a fixed interval until told to stop.
pub struct ProbeLoop<P> {
    probe: P,
    interval: Duration,
}

impl<P: Probe> ProbeLoop<P> {
    pub fn new(probe: P, interval: Duration) -> Self {
        Self { probe, interval }
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// Returns the number of attempts made.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut state = LoopState::Running;
        let mut attempts = 0u64;

        while state == LoopState::Running {
            if *shutdown.borrow_and_update() {
                state = LoopState::ShuttingDown;
                continue;
            }

            attempts += 1;
            self.probe.probe(attempts).await;

            tracing::info!(
                interval_secs = self.interval.as_secs_f64(),
                "Waiting for next attempt"
            );

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        state = LoopState::ShuttingDown;
                    }
                }
            }
        }

        tracing::info!(attempts, "Probe loop stopped");
        attempts
    }
}

/// Wait for SIGINT or SIGTERM (Ctrl+C only on non-unix).
pub async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("failed to listen for ctrl+c");
        tracing::info!("Received Ctrl+C, initiating shutdown...");
    }
}

/// Run the probe against `config.target_url` until a shutdown signal arrives,
/// then flush the span pipeline.
pub async fn run(config: Config, telemetry: Telemetry) -> anyhow::Result<()> {
    let http = HttpProbe::new(config.request_timeout(), config.fail_on_http_error)?;
    let emitter = SpanEmitter::new(telemetry.tracer(), http, config.target_url.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    tracing::info!(
        url = %config.target_url,
        interval_secs = config.interval_secs,
        "Starting probe loop"
    );

    let probe_loop = ProbeLoop::new(emitter, config.interval());
    probe_loop.run(shutdown_rx).await;

    tracing::info!("Application shutting down...");
    match telemetry.shutdown(config.shutdown_timeout()).await {
        Ok(()) => tracing::info!("Span pipeline flushed"),
        Err(e) => tracing::warn!(error = %e, "Span pipeline flush failed; exiting anyway"),
    }

    Ok(())
}

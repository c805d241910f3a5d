//! Autoscaling control loop.
//!
//! # Responsibilities
//! - Evaluate one registry snapshot per cycle
//! - Start workers under load, subject to the restart-storm guard
//! - Retire the least-loaded worker after a sustained quiet period

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::autoscale::history::RestartHistory;
use crate::autoscale::policy::{
    average_load, healthy_average_load, next_port, pick_removal, should_scale_down,
    should_scale_up, LoadWindow,
};
use crate::config::AutoscaleConfig;
use crate::lifecycle::WorkerController;
use crate::load_balancer::{Registry, Worker};
use crate::observability::metrics;

/// What one autoscaler cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleOutcome {
    /// Nothing to do.
    Steady,
    /// A worker was started and registered.
    ScaledUp { address: String },
    /// A worker was shut down and deregistered.
    ScaledDown { address: String },
    /// Scale-up was wanted but too many workers were started recently.
    StormGuarded { recent_starts: usize },
    /// Scale-up was attempted and the worker did not come up.
    StartFailed { reason: String },
}

impl ScaleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleOutcome::Steady => "steady",
            ScaleOutcome::ScaledUp { .. } => "scaled_up",
            ScaleOutcome::ScaledDown { .. } => "scaled_down",
            ScaleOutcome::StormGuarded { .. } => "storm_guarded",
            ScaleOutcome::StartFailed { .. } => "start_failed",
        }
    }
}

pub struct Autoscaler {
    registry: Arc<Registry>,
    controller: Arc<dyn WorkerController>,
    config: AutoscaleConfig,
    base_port: u16,
    history: RestartHistory,
    window: LoadWindow,
}

impl Autoscaler {
    pub fn new(
        registry: Arc<Registry>,
        controller: Arc<dyn WorkerController>,
        config: AutoscaleConfig,
        base_port: u16,
    ) -> Self {
        Self {
            history: RestartHistory::new(config.restart_history_capacity),
            window: LoadWindow::new(config.scale_down_window),
            registry,
            controller,
            config,
            base_port,
        }
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Autoscaler disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            min_workers = self.config.floor(),
            max_workers = self.config.max_workers,
            max_requests_per_worker = self.config.max_requests_per_worker,
            "Autoscaler starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; give the health monitor a cycle first.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Autoscaler received shutdown signal, exiting loop");
                    break;
                }
                _ = async {
                    ticker.tick().await;
                    self.evaluate().await;
                } => {}
            }
        }
    }

    /// Run one scaling cycle against a single registry snapshot.
    pub async fn evaluate(&mut self) -> ScaleOutcome {
        let workers = self.registry.snapshot();

        match healthy_average_load(&workers) {
            Some(avg) => self.window.push(avg),
            None => self.window.clear(),
        }

        let outcome = if should_scale_up(&workers, &self.config) {
            tracing::info!(
                workers = workers.len(),
                average_load = average_load(&workers),
                "Load above threshold, scaling up"
            );
            self.scale_up(&workers).await
        } else if should_scale_down(&workers, &self.window, &self.config) {
            self.scale_down(&workers).await
        } else {
            ScaleOutcome::Steady
        };

        if outcome != ScaleOutcome::Steady {
            metrics::record_scale_event(outcome.as_str());
        }
        outcome
    }

    async fn scale_up(&mut self, workers: &[Worker]) -> ScaleOutcome {
        let window = Duration::from_secs(self.config.restart_threshold_window_secs);
        let now = Instant::now();
        let recent_starts = self.history.count_within(window, now);
        if recent_starts >= self.config.max_restarts_in_window {
            tracing::warn!(
                recent_starts,
                window_secs = self.config.restart_threshold_window_secs,
                "Restart storm guard active, skipping scale-up"
            );
            return ScaleOutcome::StormGuarded { recent_starts };
        }

        let Some(port) = next_port(workers, self.base_port) else {
            tracing::error!("No port available for a new worker");
            return ScaleOutcome::StartFailed {
                reason: "port range exhausted".to_string(),
            };
        };

        self.history.record(now);
        match self.controller.start_worker(port).await {
            Ok(address) => {
                self.registry.register(&address);
                self.window.clear();
                tracing::info!(worker = %address, "Scaled up");
                ScaleOutcome::ScaledUp { address }
            }
            Err(e) => {
                tracing::error!(port, error = %e, "Scale-up abandoned for this cycle");
                ScaleOutcome::StartFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn scale_down(&mut self, workers: &[Worker]) -> ScaleOutcome {
        let Some(victim) = pick_removal(workers) else {
            return ScaleOutcome::Steady;
        };
        let address = victim.address.clone();

        tracing::info!(worker = %address, load = victim.active_requests, "Load low, scaling down");
        if let Err(e) = self.controller.shutdown_worker(&address).await {
            tracing::warn!(worker = %address, error = %e, "Shutdown request failed, removing anyway");
        }
        self.registry.deregister(&address);
        self.window.clear();

        ScaleOutcome::ScaledDown { address }
    }
}

//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every registered worker
//! - Update worker health and reported load in the registry

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::probe::probe_worker;
use crate::http::client::{build_client, HttpClient};
use crate::load_balancer::{HealthState, Registry};
use crate::observability::metrics;

pub struct HealthMonitor {
    registry: Arc<Registry>,
    config: HealthCheckConfig,
    client: HttpClient,
}

impl HealthMonitor {
    pub fn new(registry: Arc<Registry>, config: HealthCheckConfig) -> Self {
        let client = build_client(Duration::from_secs(config.timeout_secs));
        Self {
            registry,
            config,
            client,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            path = %self.config.path,
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
                _ = async {
                    ticker.tick().await;
                    self.check_all().await;
                } => {}
            }
        }
    }

    /// Probe every worker of one registry snapshot concurrently and apply the
    /// results.
    pub async fn check_all(&self) {
        let workers = self.registry.snapshot();
        if workers.is_empty() {
            tracing::debug!("No workers registered, skipping health cycle");
            return;
        }

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let probes = workers.iter().map(|worker| {
            let address = worker.address.as_str();
            async move {
                let result = probe_worker(&self.client, address, &self.config.path, timeout).await;
                (address, result)
            }
        });
        let results = join_all(probes).await;

        let mut healthy_count = 0;
        for (address, result) in results {
            let (health, load) = match result {
                Ok(load) => (HealthState::Healthy, load),
                Err(e) => {
                    tracing::warn!(worker = %address, error = %e, "Health check failed");
                    (HealthState::Unhealthy, 0)
                }
            };

            match self.registry.update_health(address, health, load) {
                Some(previous) if previous != health => {
                    tracing::info!(
                        worker = %address,
                        from = previous.as_str(),
                        to = health.as_str(),
                        "Worker health changed"
                    );
                }
                Some(_) => {}
                None => {
                    tracing::debug!(worker = %address, "Worker removed during health cycle");
                    continue;
                }
            }

            if health == HealthState::Healthy {
                healthy_count += 1;
            }
            metrics::record_worker_health(address, health == HealthState::Healthy);
        }

        let total = self.registry.len();
        metrics::record_pool_size(healthy_count, total.saturating_sub(healthy_count));
        tracing::debug!(healthy = healthy_count, total, "Health cycle complete");
    }
}

//! Local-process worker controller.
//!
//! # Responsibilities
//! - Spawn the configured worker command with the allocated port
//! - Poll the new worker's health endpoint until it answers or time runs out
//! - Stop workers with `POST /shutdown`, killing spawned children that linger

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::{self, Instant};

use crate::config::LifecycleConfig;
use crate::health::probe::probe_worker;
use crate::http::client::{build_client, HttpClient};
use crate::lifecycle::controller::{LifecycleError, WorkerController};
use crate::resilience::Backoff;

/// Timeout for a single readiness probe while a worker boots.
const READY_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Replace every `{port}` placeholder in `args`.
pub fn render_args(args: &[String], port: u16) -> Vec<String> {
    let port = port.to_string();
    args.iter().map(|a| a.replace("{port}", &port)).collect()
}

/// Starts workers as child processes of the balancer.
pub struct ProcessController {
    config: LifecycleConfig,
    health_path: String,
    shutdown_timeout: Duration,
    client: HttpClient,
    children: Mutex<HashMap<String, Child>>,
}

impl ProcessController {
    pub fn new(config: LifecycleConfig, health_path: String, shutdown_timeout: Duration) -> Self {
        Self {
            config,
            health_path,
            client: build_client(shutdown_timeout),
            shutdown_timeout,
            children: Mutex::new(HashMap::new()),
        }
    }

    fn command(&self, port: u16) -> Command {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(render_args(&self.config.args, port))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    async fn wait_until_ready(&self, address: &str, child: &mut Child) -> Result<(), String> {
        let deadline = Instant::now() + Duration::from_secs(self.config.startup_timeout_secs);
        let mut backoff = Backoff::new(100, 1000);

        loop {
            if let Ok(Some(status)) = child.try_wait() {
                return Err(format!("process exited during startup with {}", status));
            }

            match probe_worker(&self.client, address, &self.health_path, READY_PROBE_TIMEOUT).await {
                Ok(_) => return Ok(()),
                Err(e) => tracing::debug!(worker = %address, error = %e, "Worker not ready yet"),
            }

            if Instant::now() >= deadline {
                return Err(format!(
                    "not ready after {}s ({} probes)",
                    self.config.startup_timeout_secs,
                    backoff.attempts() + 1
                ));
            }
            time::sleep(backoff.next_delay()).await;
        }
    }

    async fn send_shutdown_request(&self, address: &str) -> Result<(), String> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("http://{}/shutdown", address))
            .header("user-agent", "worker-balancer")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        match time::timeout(self.shutdown_timeout, self.client.request(request)).await {
            Ok(Ok(response)) if response.status().is_success() => Ok(()),
            Ok(Ok(response)) => Err(format!("worker answered {}", response.status())),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("timed out after {:?}", self.shutdown_timeout)),
        }
    }

    /// Forget children that have exited and kill any child still bound to
    /// `reuse`. Workers deregistered over HTTP leave their process behind.
    async fn prune(&self, reuse: &str) {
        let mut children = self.children.lock().await;
        children.retain(|address, child| match child.try_wait() {
            Ok(Some(status)) => {
                tracing::info!(worker = %address, %status, "Forgetting exited worker process");
                false
            }
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(worker = %address, error = %e, "Failed to poll worker process");
                true
            }
        });

        if let Some(mut stale) = children.remove(reuse) {
            tracing::warn!(worker = %reuse, "Killing untracked worker process before reusing its port");
            if let Err(e) = stale.kill().await {
                tracing::error!(worker = %reuse, error = %e, "Failed to kill worker process");
            }
        }
    }

    async fn reap(&self, address: &str) {
        let Some(mut child) = self.children.lock().await.remove(address) else {
            return;
        };
        let grace = Duration::from_secs(self.config.shutdown_grace_secs);
        match time::timeout(grace, child.wait()).await {
            Ok(Ok(status)) => tracing::info!(worker = %address, %status, "Worker process exited"),
            Ok(Err(e)) => tracing::warn!(worker = %address, error = %e, "Failed to wait for worker process"),
            Err(_) => {
                tracing::warn!(worker = %address, "Worker did not exit in time, killing");
                if let Err(e) = child.kill().await {
                    tracing::error!(worker = %address, error = %e, "Failed to kill worker process");
                }
            }
        }
    }
}

#[async_trait]
impl WorkerController for ProcessController {
    async fn start_worker(&self, port: u16) -> Result<String, LifecycleError> {
        let address = format!("{}:{}", self.config.worker_host, port);
        let start_failed = |reason: String| LifecycleError::StartFailed { port, reason };
        self.prune(&address).await;

        tracing::info!(
            command = %self.config.command,
            worker = %address,
            "Starting worker process"
        );
        let mut child = self.command(port).spawn().map_err(|e| start_failed(e.to_string()))?;

        if let Err(reason) = self.wait_until_ready(&address, &mut child).await {
            let _ = child.kill().await;
            return Err(start_failed(reason));
        }

        tracing::info!(worker = %address, pid = ?child.id(), "Worker process ready");
        self.children.lock().await.insert(address.clone(), child);
        Ok(address)
    }

    async fn shutdown_worker(&self, address: &str) -> Result<(), LifecycleError> {
        let result = self.send_shutdown_request(address).await;
        if let Err(ref reason) = result {
            tracing::warn!(worker = %address, reason = %reason, "Graceful shutdown request failed");
        }
        self.reap(address).await;

        result.map_err(|reason| LifecycleError::Shutdown {
            address: address.to_string(),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_args() {
        let args = vec!["worker.py".to_string(), "--port={port}".to_string(), "{port}".to_string()];
        assert_eq!(render_args(&args, 8004), vec!["worker.py", "--port=8004", "8004"]);
    }

    #[tokio::test]
    async fn test_start_failure_for_missing_binary() {
        let config = LifecycleConfig {
            command: "/nonexistent/worker-binary".into(),
            startup_timeout_secs: 1,
            ..Default::default()
        };
        let controller =
            ProcessController::new(config, "/worker-health".into(), Duration::from_millis(200));

        let err = controller.start_worker(18_901).await.unwrap_err();
        assert!(matches!(err, LifecycleError::StartFailed { port: 18_901, .. }));
    }

    #[tokio::test]
    async fn test_shutdown_unreachable_worker_is_reported() {
        let controller = ProcessController::new(
            LifecycleConfig::default(),
            "/worker-health".into(),
            Duration::from_millis(200),
        );
        let err = controller.shutdown_worker("127.0.0.1:1").await.unwrap_err();
        assert!(matches!(err, LifecycleError::Shutdown { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_prune_forgets_exited_and_replaces_stale_children() {
        let controller = ProcessController::new(
            LifecycleConfig::default(),
            "/worker-health".into(),
            Duration::from_millis(200),
        );
        let exited = Command::new("true").spawn().unwrap();
        let stale = Command::new("sleep").arg("30").kill_on_drop(true).spawn().unwrap();
        let alive = Command::new("sleep").arg("30").kill_on_drop(true).spawn().unwrap();
        {
            let mut children = controller.children.lock().await;
            children.insert("127.0.0.1:8001".into(), exited);
            children.insert("127.0.0.1:8002".into(), stale);
            children.insert("127.0.0.1:8003".into(), alive);
        }
        time::sleep(Duration::from_millis(300)).await;

        controller.prune("127.0.0.1:8002").await;

        let children = controller.children.lock().await;
        let mut tracked: Vec<_> = children.keys().cloned().collect();
        tracked.sort();
        assert_eq!(tracked, vec!["127.0.0.1:8003".to_string()]);
    }
}

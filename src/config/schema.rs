//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the worker balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BalancerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Autoscaling settings.
    pub autoscale: AutoscaleConfig,

    /// How new workers are started and old ones stopped.
    pub lifecycle: LifecycleConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable active health checks.
    pub enabled: bool,

    /// Health check interval in seconds.
    pub interval_secs: u64,

    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,

    /// Path probed on every worker.
    pub path: String,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 10,
            timeout_secs: 2,
            path: "/worker-health".to_string(),
        }
    }
}

/// Autoscaler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AutoscaleConfig {
    /// Enable the autoscaling loop.
    pub enabled: bool,

    /// Evaluation interval in seconds.
    pub interval_secs: u64,

    /// Average in-flight requests per worker above which the pool grows.
    pub max_requests_per_worker: u64,

    /// Floor for the pool size. Values below 1 are treated as 1.
    pub min_workers: usize,

    /// Ceiling for the pool size.
    pub max_workers: usize,

    /// Average in-flight requests per healthy worker below which the pool
    /// may shrink.
    pub scale_down_threshold: f64,

    /// Number of consecutive low-load evaluations required before shrinking.
    pub scale_down_window: usize,

    /// Trailing window for the restart-storm guard, in seconds.
    pub restart_threshold_window_secs: u64,

    /// Maximum worker starts allowed inside the trailing window.
    pub max_restarts_in_window: usize,

    /// Number of start timestamps kept in the restart history.
    pub restart_history_capacity: usize,
}

impl Default for AutoscaleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 15,
            max_requests_per_worker: 10,
            min_workers: 1,
            max_workers: 5,
            scale_down_threshold: 2.0,
            scale_down_window: 3,
            restart_threshold_window_secs: 300,
            max_restarts_in_window: 3,
            restart_history_capacity: 10,
        }
    }
}

impl AutoscaleConfig {
    /// Effective pool floor; the pool never drops to zero capacity.
    pub fn floor(&self) -> usize {
        self.min_workers.max(1)
    }
}

/// Worker process settings used by the process controller.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Program launched for every new worker.
    pub command: String,

    /// Arguments; every `{port}` is replaced by the allocated port.
    pub args: Vec<String>,

    /// Host part of the addresses given to spawned workers.
    pub worker_host: String,

    /// Port used when no registered worker carries a parseable port.
    pub base_port: u16,

    /// How long a new worker has to answer its health probe, in seconds.
    pub startup_timeout_secs: u64,

    /// How long a stopping worker may take to exit before it is killed.
    pub shutdown_grace_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            args: Vec::new(),
            worker_host: "127.0.0.1".to_string(),
            base_port: 8001,
            startup_timeout_secs: 10,
            shutdown_grace_secs: 5,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Timeout for a forwarded request in seconds.
    pub forward_secs: u64,

    /// Timeout for the graceful-shutdown request sent to a worker.
    pub shutdown_request_secs: u64,

    /// Overall inbound request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            forward_secs: 30,
            shutdown_request_secs: 2,
            request_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: BalancerConfig = toml::from_str(
            r#"
            [autoscale]
            enabled = true
            max_workers = 8

            [lifecycle]
            command = "python"
            args = ["worker.py", "{port}"]
            "#,
        )
        .unwrap();

        assert!(config.autoscale.enabled);
        assert_eq!(config.autoscale.max_workers, 8);
        assert_eq!(config.autoscale.max_restarts_in_window, 3);
        assert_eq!(config.lifecycle.args, vec!["worker.py", "{port}"]);
        assert_eq!(config.health_check.path, "/worker-health");
        assert_eq!(config.listener.bind_address, "127.0.0.1:8000");
    }

    #[test]
    fn test_floor_never_zero() {
        let config = AutoscaleConfig {
            min_workers: 0,
            ..Default::default()
        };
        assert_eq!(config.floor(), 1);
    }
}

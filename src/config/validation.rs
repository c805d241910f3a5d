//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, pool bounds consistent)
//! - Check that addresses parse before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::BalancerConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human readable description.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let health = &config.health_check;
    if health.interval_secs == 0 {
        errors.push(ValidationError::new("health_check.interval_secs", "must be greater than 0"));
    }
    if health.timeout_secs == 0 {
        errors.push(ValidationError::new("health_check.timeout_secs", "must be greater than 0"));
    }
    if !health.path.starts_with('/') {
        errors.push(ValidationError::new("health_check.path", "must start with '/'"));
    }

    let scale = &config.autoscale;
    if scale.interval_secs == 0 {
        errors.push(ValidationError::new("autoscale.interval_secs", "must be greater than 0"));
    }
    if scale.min_workers == 0 {
        errors.push(ValidationError::new("autoscale.min_workers", "must be at least 1"));
    }
    if scale.max_workers < scale.floor() {
        errors.push(ValidationError::new(
            "autoscale.max_workers",
            format!("must be >= min_workers ({})", scale.floor()),
        ));
    }
    if scale.scale_down_window == 0 {
        errors.push(ValidationError::new("autoscale.scale_down_window", "must be at least 1"));
    }
    if scale.scale_down_threshold < 0.0 {
        errors.push(ValidationError::new("autoscale.scale_down_threshold", "must not be negative"));
    }
    if scale.max_restarts_in_window == 0 {
        errors.push(ValidationError::new("autoscale.max_restarts_in_window", "must be at least 1"));
    }
    if scale.restart_history_capacity < scale.max_restarts_in_window {
        errors.push(ValidationError::new(
            "autoscale.restart_history_capacity",
            "must be >= max_restarts_in_window",
        ));
    }
    if scale.enabled && config.lifecycle.command.trim().is_empty() {
        errors.push(ValidationError::new(
            "lifecycle.command",
            "required when autoscaling is enabled",
        ));
    }

    if config.timeouts.forward_secs == 0 {
        errors.push(ValidationError::new("timeouts.forward_secs", "must be greater than 0"));
    }
    if config.timeouts.shutdown_request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.shutdown_request_secs",
            "must be greater than 0",
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Worker record.
//!
//! # Responsibilities
//! - Represent a single backend worker
//! - Track last known in-flight request count (reported by the worker)
//! - Track health state (Healthy/Unhealthy)

use serde::Serialize;
use std::time::Instant;

/// Health State enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Healthy => "healthy",
            HealthState::Unhealthy => "unhealthy",
        }
    }
}

/// A single backend worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Worker {
    /// Opaque `host:port` identifier, unique within a registry.
    pub address: String,
    /// Health from the most recent probe or registration.
    pub health: HealthState,
    /// Last reported number of in-flight requests.
    pub active_requests: u64,
    /// When the worker was last probed, registered or reported load.
    pub last_checked: Instant,
}

impl Worker {
    /// Create a new healthy, idle worker.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            health: HealthState::Healthy,
            active_requests: 0,
            last_checked: Instant::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.health == HealthState::Healthy
    }

    /// Port component of the address, if the address ends in one.
    pub fn port(&self) -> Option<u16> {
        self.address
            .rsplit_once(':')
            .and_then(|(_, port)| port.parse().ok())
    }
}

//! Worker registry.
//!
//! # Responsibilities
//! - Own the authoritative, insertion-ordered list of workers
//! - Serialize every mutation and every selection behind one lock
//! - Hand out point-in-time snapshots for monitoring and scaling

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::error::BalancerError;
use crate::load_balancer::{
    round_robin::RoundRobin,
    worker::{HealthState, Worker},
    SelectionPolicy,
};

/// Result of a `register` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The address was not known before.
    Added,
    /// The address was already registered; its state was reset.
    Refreshed,
}

#[derive(Debug)]
struct RegistryInner {
    workers: Vec<Worker>,
    policy: Box<dyn SelectionPolicy>,
}

/// The set of known workers plus the rotation state used to pick among them.
#[derive(Debug)]
pub struct Registry {
    inner: Mutex<RegistryInner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry using round-robin selection.
    pub fn new() -> Self {
        Self::with_policy(Box::new(RoundRobin::new()))
    }

    /// Create an empty registry using the given selection policy.
    pub fn with_policy(policy: Box<dyn SelectionPolicy>) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                workers: Vec::new(),
                policy,
            }),
        }
    }

    // Every critical section is synchronous, so a panic elsewhere cannot leave
    // a half-applied mutation behind.
    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a worker, or reset an existing one to healthy and idle.
    pub fn register(&self, address: &str) -> RegisterOutcome {
        let mut inner = self.lock();
        match inner.workers.iter_mut().find(|w| w.address == address) {
            Some(worker) => {
                worker.health = HealthState::Healthy;
                worker.active_requests = 0;
                worker.last_checked = Instant::now();
                tracing::debug!(worker = %address, "Worker re-registered");
                RegisterOutcome::Refreshed
            }
            None => {
                inner.workers.push(Worker::new(address));
                tracing::info!(worker = %address, total = inner.workers.len(), "Worker registered");
                RegisterOutcome::Added
            }
        }
    }

    /// Remove a worker. Returns false if it was not registered.
    pub fn deregister(&self, address: &str) -> bool {
        let mut inner = self.lock();
        let before = inner.workers.len();
        inner.workers.retain(|w| w.address != address);
        let removed = inner.workers.len() < before;
        if removed {
            tracing::info!(worker = %address, total = inner.workers.len(), "Worker deregistered");
        }
        removed
    }

    /// Record a load report from a worker. Unknown workers are ignored.
    pub fn report_load(&self, address: &str, load: u64) -> bool {
        let mut inner = self.lock();
        match inner.workers.iter_mut().find(|w| w.address == address) {
            Some(worker) => {
                worker.active_requests = load;
                worker.last_checked = Instant::now();
                true
            }
            None => {
                tracing::warn!(worker = %address, load, "Load report from unknown worker dropped");
                false
            }
        }
    }

    /// Apply one probe result atomically.
    ///
    /// Returns the previous health state, or `None` when the worker has been
    /// removed since the probe started.
    pub fn update_health(
        &self,
        address: &str,
        health: HealthState,
        active_requests: u64,
    ) -> Option<HealthState> {
        let mut inner = self.lock();
        let worker = inner.workers.iter_mut().find(|w| w.address == address)?;
        let previous = worker.health;
        worker.health = health;
        worker.active_requests = active_requests;
        worker.last_checked = Instant::now();
        Some(previous)
    }

    /// Pick the next healthy worker.
    pub fn select_next(&self) -> Result<Worker, BalancerError> {
        let mut inner = self.lock();
        let RegistryInner { workers, policy } = &mut *inner;

        let healthy: Vec<&Worker> = workers.iter().filter(|w| w.is_healthy()).collect();
        let index = policy
            .select(&healthy)
            .ok_or(BalancerError::NoHealthyWorkers)?;
        healthy
            .get(index)
            .map(|w| (*w).clone())
            .ok_or(BalancerError::NoHealthyWorkers)
    }

    /// Point-in-time copy of all workers in registration order.
    pub fn snapshot(&self) -> Vec<Worker> {
        self.lock().workers.clone()
    }

    /// Addresses of all workers in registration order.
    pub fn addresses(&self) -> Vec<String> {
        self.lock().workers.iter().map(|w| w.address.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(addrs: &[&str]) -> Registry {
        let registry = Registry::new();
        for a in addrs {
            registry.register(a);
        }
        registry
    }

    #[test]
    fn test_register_is_idempotent_and_resets_state() {
        let registry = registry_with(&["w1:8001"]);
        registry.update_health("w1:8001", HealthState::Unhealthy, 0);
        registry.report_load("w1:8001", 7);

        assert_eq!(registry.register("w1:8001"), RegisterOutcome::Refreshed);

        let workers = registry.snapshot();
        assert_eq!(workers.len(), 1);
        assert_eq!(workers[0].health, HealthState::Healthy);
        assert_eq!(workers[0].active_requests, 0);
    }

    #[test]
    fn test_deregister_absent_is_noop() {
        let registry = registry_with(&["w1:8001"]);
        assert!(!registry.deregister("w9:8009"));
        assert!(registry.deregister("w1:8001"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_report_load_unknown_worker_dropped() {
        let registry = registry_with(&["w1:8001"]);
        assert!(!registry.report_load("ghost:1", 3));
        assert!(registry.report_load("w1:8001", 3));
        assert_eq!(registry.snapshot()[0].active_requests, 3);
    }

    #[test]
    fn test_full_rotation_visits_each_once() {
        let registry = registry_with(&["w1:1", "w2:2", "w3:3", "w4:4"]);
        let picks: Vec<String> = (0..4)
            .map(|_| registry.select_next().unwrap().address)
            .collect();
        assert_eq!(picks, vec!["w1:1", "w2:2", "w3:3", "w4:4"]);
        assert_eq!(registry.select_next().unwrap().address, "w1:1");
    }

    #[test]
    fn test_unhealthy_worker_skipped() {
        let registry = registry_with(&["w1:1", "w2:2", "w3:3"]);
        registry.update_health("w2:2", HealthState::Unhealthy, 0);

        let picks: Vec<String> = (0..3)
            .map(|_| registry.select_next().unwrap().address)
            .collect();
        assert_eq!(picks, vec!["w1:1", "w3:3", "w1:1"]);
    }

    #[test]
    fn test_worker_flips_unhealthy_mid_rotation() {
        let registry = registry_with(&["w1:1", "w2:2", "w3:3"]);
        assert_eq!(registry.select_next().unwrap().address, "w1:1");
        registry.update_health("w2:2", HealthState::Unhealthy, 0);

        for _ in 0..10 {
            assert_ne!(registry.select_next().unwrap().address, "w2:2");
        }

        registry.update_health("w2:2", HealthState::Healthy, 0);
        let seen: Vec<String> = (0..3)
            .map(|_| registry.select_next().unwrap().address)
            .collect();
        assert!(seen.contains(&"w2:2".to_string()));
    }

    #[test]
    fn test_no_healthy_workers_never_panics() {
        let registry = Registry::new();
        assert_eq!(registry.select_next(), Err(BalancerError::NoHealthyWorkers));

        let registry = registry_with(&["w1:1", "w2:2", "w3:3"]);
        registry.select_next().unwrap();
        registry.select_next().unwrap();
        for addr in ["w1:1", "w2:2", "w3:3"] {
            registry.update_health(addr, HealthState::Unhealthy, 0);
        }
        for _ in 0..5 {
            assert_eq!(registry.select_next(), Err(BalancerError::NoHealthyWorkers));
        }
    }

    #[test]
    fn test_removal_during_rotation_stays_in_range() {
        let registry = registry_with(&["w1:1", "w2:2", "w3:3"]);
        registry.select_next().unwrap();
        registry.select_next().unwrap();
        registry.deregister("w3:3");
        registry.deregister("w2:2");
        assert_eq!(registry.select_next().unwrap().address, "w1:1");
    }

    #[test]
    fn test_update_health_for_removed_worker() {
        let registry = registry_with(&["w1:1"]);
        registry.deregister("w1:1");
        assert_eq!(registry.update_health("w1:1", HealthState::Healthy, 2), None);
        assert!(registry.is_empty());
    }
}

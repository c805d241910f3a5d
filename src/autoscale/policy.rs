//! Scaling decisions.
//!
//! Pure functions over one registry snapshot; the loop in `scaler.rs` owns
//! the side effects.

use std::collections::VecDeque;

use crate::config::AutoscaleConfig;
use crate::load_balancer::Worker;

/// Average in-flight requests over all workers, dividing by at least one.
///
/// Loads are summed as `f64`; reported values are untrusted and may be huge.
pub fn average_load(workers: &[Worker]) -> f64 {
    let total: f64 = workers.iter().map(|w| w.active_requests as f64).sum();
    total / workers.len().max(1) as f64
}

/// Average in-flight requests over healthy workers, `None` if there are none.
pub fn healthy_average_load(workers: &[Worker]) -> Option<f64> {
    let (count, total) = workers
        .iter()
        .filter(|w| w.is_healthy())
        .fold((0usize, 0f64), |(n, sum), w| (n + 1, sum + w.active_requests as f64));
    (count > 0).then(|| total / count as f64)
}

/// Grow when the pool is below its ceiling and the average load is too high.
pub fn should_scale_up(workers: &[Worker], config: &AutoscaleConfig) -> bool {
    workers.len() < config.max_workers
        && average_load(workers) > config.max_requests_per_worker as f64
}

/// Shrink when the pool is above its floor and the healthy average load has
/// stayed low for the whole trailing window.
pub fn should_scale_down(workers: &[Worker], window: &LoadWindow, config: &AutoscaleConfig) -> bool {
    workers.len() > config.floor() && window.sustained_below(config.scale_down_threshold)
}

/// The last few healthy-average samples.
#[derive(Debug, Clone)]
pub struct LoadWindow {
    samples: VecDeque<f64>,
    size: usize,
}

impl LoadWindow {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            samples: VecDeque::with_capacity(size),
            size,
        }
    }

    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.size {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// True only once the window is full and every sample is below `threshold`.
    pub fn sustained_below(&self, threshold: f64) -> bool {
        self.samples.len() == self.size && self.samples.iter().all(|&s| s < threshold)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Port for the next worker: one past the highest registered port, or
/// `base_port` when no address carries a port. `None` once ports run out.
pub fn next_port(workers: &[Worker], base_port: u16) -> Option<u16> {
    match workers.iter().filter_map(Worker::port).max() {
        Some(highest) => highest.checked_add(1),
        None => Some(base_port),
    }
}

/// Worker to remove on scale-down: the least-loaded healthy worker, preferring
/// the most recently registered on ties. Never the only worker.
pub fn pick_removal(workers: &[Worker]) -> Option<&Worker> {
    if workers.len() <= 1 {
        return None;
    }
    workers
        .iter()
        .rev()
        .filter(|w| w.is_healthy())
        .min_by_key(|w| w.active_requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::HealthState;

    fn pool(loads: &[u64]) -> Vec<Worker> {
        loads
            .iter()
            .enumerate()
            .map(|(i, &load)| {
                let mut w = Worker::new(format!("127.0.0.1:{}", 8001 + i));
                w.active_requests = load;
                w
            })
            .collect()
    }

    fn config() -> AutoscaleConfig {
        AutoscaleConfig {
            max_requests_per_worker: 10,
            min_workers: 1,
            max_workers: 4,
            scale_down_threshold: 2.0,
            scale_down_window: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_scale_up_above_threshold() {
        assert!(should_scale_up(&pool(&[15, 12]), &config()));
    }

    #[test]
    fn test_no_scale_up_at_threshold() {
        assert!(!should_scale_up(&pool(&[10, 10]), &config()));
    }

    #[test]
    fn test_no_scale_up_at_max_workers() {
        assert!(!should_scale_up(&pool(&[50, 50, 50, 50]), &config()));
    }

    #[test]
    fn test_no_scale_up_when_empty() {
        assert!(!should_scale_up(&[], &config()));
    }

    #[test]
    fn test_huge_reported_loads_do_not_overflow() {
        let workers = pool(&[u64::MAX, u64::MAX, 1]);
        assert!(average_load(&workers) > 1e18);
        assert!(healthy_average_load(&workers).unwrap() > 1e18);
        assert!(should_scale_up(&workers, &config()));
    }

    #[test]
    fn test_healthy_average_ignores_unhealthy() {
        let mut workers = pool(&[4, 100]);
        workers[1].health = HealthState::Unhealthy;
        assert_eq!(healthy_average_load(&workers), Some(4.0));

        workers[0].health = HealthState::Unhealthy;
        assert_eq!(healthy_average_load(&workers), None);
    }

    #[test]
    fn test_scale_down_needs_full_window() {
        let workers = pool(&[0, 1]);
        let mut window = LoadWindow::new(3);
        window.push(0.5);
        window.push(0.5);
        assert!(!should_scale_down(&workers, &window, &config()));
        window.push(0.5);
        assert!(should_scale_down(&workers, &window, &config()));
    }

    #[test]
    fn test_single_spike_blocks_scale_down() {
        let workers = pool(&[0, 1]);
        let mut window = LoadWindow::new(3);
        for s in [0.5, 5.0, 0.5] {
            window.push(s);
        }
        assert!(!should_scale_down(&workers, &window, &config()));
    }

    #[test]
    fn test_scale_down_respects_floor() {
        let workers = pool(&[0]);
        let mut window = LoadWindow::new(1);
        window.push(0.0);
        assert!(!should_scale_down(&workers, &window, &config()));

        let zero_floor = AutoscaleConfig {
            min_workers: 0,
            ..config()
        };
        assert!(!should_scale_down(&workers, &window, &zero_floor));
    }

    #[test]
    fn test_next_port() {
        assert_eq!(next_port(&[], 8001), Some(8001));
        assert_eq!(next_port(&pool(&[0, 0, 0]), 9000), Some(8004));
        assert_eq!(next_port(&[Worker::new("named-worker")], 9000), Some(9000));
        assert_eq!(next_port(&[Worker::new("h:65535")], 9000), None);
    }

    #[test]
    fn test_pick_removal_least_loaded_latest_on_tie() {
        let workers = pool(&[3, 1, 1, 5]);
        assert_eq!(pick_removal(&workers).unwrap().address, "127.0.0.1:8003");
    }

    #[test]
    fn test_pick_removal_never_only_worker() {
        assert!(pick_removal(&pool(&[0])).is_none());
    }
}

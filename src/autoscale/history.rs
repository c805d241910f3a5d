//! Bounded record of recent worker starts.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Fixed-capacity ring of worker-start timestamps, oldest first.
#[derive(Debug, Clone)]
pub struct RestartHistory {
    starts: VecDeque<Instant>,
    capacity: usize,
}

impl RestartHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            starts: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a start, evicting the oldest entry when full.
    pub fn record(&mut self, at: Instant) {
        if self.starts.len() == self.capacity {
            self.starts.pop_front();
        }
        self.starts.push_back(at);
    }

    /// Number of recorded starts no older than `window` at `now`.
    pub fn count_within(&self, window: Duration, now: Instant) -> usize {
        self.starts
            .iter()
            .filter(|&&at| now.saturating_duration_since(at) <= window)
            .count()
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

//! Round-robin load balancing strategy.

use crate::load_balancer::{worker::Worker, SelectionPolicy};

/// Round-robin selector.
/// Stores a cursor into the healthy subset and rotates through it.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionPolicy for RoundRobin {
    fn select(&mut self, healthy: &[&Worker]) -> Option<usize> {
        if healthy.is_empty() {
            return None;
        }

        // The healthy subset may have shrunk since the last call.
        let index = self.cursor % healthy.len();
        self.cursor = (index + 1) % healthy.len();
        Some(index)
    }
}

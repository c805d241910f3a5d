//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → registry.rs (lock, collect healthy workers in registration order)
//!     → round_robin.rs (advance cursor over the healthy subset)
//!     → Return selected worker or NoHealthyWorkers
//!
//! Health monitor / autoscaler / registration endpoints
//!     → registry.rs (register, deregister, report_load, update_health)
//! ```
//!
//! # Design Decisions
//! - One lock guards both the worker list and the rotation cursor
//! - The cursor is reduced modulo the current healthy count on every call
//! - Unhealthy workers are skipped without consuming a rotation slot

pub mod registry;
pub mod round_robin;
pub mod worker;

use std::fmt::Debug;

pub use registry::{RegisterOutcome, Registry};
pub use round_robin::RoundRobin;
pub use worker::{HealthState, Worker};

/// Strategy for picking one worker out of the healthy subset.
///
/// Implementations keep their own rotation state; the registry calls them
/// while holding its lock, so `select` never races with a mutation.
pub trait SelectionPolicy: Send + Debug {
    /// Return the index into `healthy` of the worker to use, or `None` if the
    /// slice is empty.
    fn select(&mut self, healthy: &[&Worker]) -> Option<usize>;
}

//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic timer (active.rs)
//!     → snapshot registry
//!     → probe.rs: GET /worker-health on every worker, concurrently
//!     → registry.update_health(address, Healthy|Unhealthy, load)
//! ```
//!
//! # Design Decisions
//! - A single failed probe marks the worker Unhealthy; a single good probe
//!   brings it back
//! - Each result is applied as one registry mutation, so selection never sees
//!   a half-updated worker
//! - Probe failures are logged and never leave the monitor

pub mod active;
pub mod probe;

pub use active::HealthMonitor;
pub use probe::{HealthReport, ProbeError};

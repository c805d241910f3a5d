//! Autoscaling subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic timer (scaler.rs)
//!     → registry snapshot
//!     → policy.rs: should_scale_up / should_scale_down
//!     → history.rs: restart-storm guard (scale-up only)
//!     → WorkerController: start_worker / shutdown_worker
//!     → registry.register / registry.deregister
//! ```
//!
//! # Design Decisions
//! - Both decisions read the same snapshot; scale-up wins if both apply
//! - Scale-down needs a full trailing window of low samples
//! - The pool never shrinks below one worker

pub mod history;
pub mod policy;
pub mod scaler;

pub use history::RestartHistory;
pub use scaler::{Autoscaler, ScaleOutcome};

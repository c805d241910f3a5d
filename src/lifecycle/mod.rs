//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → metrics → bind listener → run server + loops
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger → server drains, loops exit
//!
//! Workers (controller.rs, process.rs):
//!     Autoscaler → WorkerController::start_worker / shutdown_worker
//! ```
//!
//! # Design Decisions
//! - Listeners start last (traffic only when ready)
//! - Worker start/stop sits behind a trait so the autoscaler is independent of
//!   how a worker is actually run

pub mod controller;
pub mod process;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use controller::{LifecycleError, WorkerController};
pub use process::ProcessController;
pub use shutdown::Shutdown;

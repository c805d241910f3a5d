//! Worker start/stop seam used by the autoscaler.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from starting or stopping a worker.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A new worker could not be started or never became reachable.
    #[error("Failed to start worker on port {port}: {reason}")]
    StartFailed { port: u16, reason: String },

    /// The graceful-shutdown request did not go through.
    #[error("Failed to shut down worker {address}: {reason}")]
    Shutdown { address: String, reason: String },
}

/// Starts and stops worker instances.
///
/// The autoscaler only depends on this trait, so it does not care whether a
/// worker is a local process, a container or something else entirely.
#[async_trait]
pub trait WorkerController: Send + Sync {
    /// Start a worker listening on `port` and return its address once it is
    /// reachable.
    async fn start_worker(&self, port: u16) -> Result<String, LifecycleError>;

    /// Ask a worker to terminate gracefully. Best effort: the worker is about
    /// to be removed either way.
    async fn shutdown_worker(&self, address: &str) -> Result<(), LifecycleError>;
}

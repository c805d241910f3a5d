//! Errors visible at the request level.
//!
//! Failures local to a single worker (probes, shutdown requests, process
//! starts) have their own error types next to the code that produces them and
//! are converted into state changes; only the variants here ever reach a
//! client.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised by the worker registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalancerError {
    /// Every registered worker is unhealthy, or none are registered.
    #[error("No healthy workers available")]
    NoHealthyWorkers,
}

/// Errors raised while forwarding a request to a worker.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Selection failed before any network call was made.
    #[error(transparent)]
    Selection(#[from] BalancerError),

    /// The worker could not be reached or did not answer in time.
    #[error("Worker {worker} unreachable: {reason}")]
    Transport { worker: String, reason: String },

    /// Anything else that went wrong while relaying the exchange.
    #[error("Forwarding failed: {0}")]
    Internal(String),
}

impl ForwardError {
    /// Status code returned to the client on the proxy path.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForwardError::Selection(BalancerError::NoHealthyWorkers) => StatusCode::SERVICE_UNAVAILABLE,
            ForwardError::Transport { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ForwardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_error_status_mapping() {
        assert_eq!(
            ForwardError::from(BalancerError::NoHealthyWorkers).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        let transport = ForwardError::Transport {
            worker: "127.0.0.1:8001".into(),
            reason: "connection refused".into(),
        };
        assert_eq!(transport.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ForwardError::Internal("bad uri".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

//! A single worker health probe.
//!
//! # Responsibilities
//! - Issue `GET {path}` to one worker under a timeout
//! - Interpret the `{status, active_requests}` report
//!
//! # Design Decisions
//! - Timeout covers connect, response head and body
//! - Any failure is a `ProbeError`; the caller turns it into Unhealthy

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tokio::time;

use crate::http::client::HttpClient;

/// Upper bound on a health report body.
const MAX_REPORT_BYTES: usize = 64 * 1024;

/// Why a probe did not produce a healthy report.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to build probe request: {0}")]
    Request(String),

    #[error("connection error: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("non-success status {0}")]
    Status(StatusCode),

    #[error("malformed health report: {0}")]
    Body(String),

    #[error("worker reported status '{0}'")]
    NotOk(String),
}

/// Body returned by a worker's health endpoint.
#[derive(Debug, Deserialize)]
pub struct HealthReport {
    pub status: String,
    /// Workers that do not track load omit this field.
    #[serde(default)]
    pub active_requests: u64,
}

/// Interpret a probe response. Returns the reported in-flight request count.
pub fn interpret(status: StatusCode, body: &[u8]) -> Result<u64, ProbeError> {
    if status != StatusCode::OK {
        return Err(ProbeError::Status(status));
    }
    let report: HealthReport =
        serde_json::from_slice(body).map_err(|e| ProbeError::Body(e.to_string()))?;
    if report.status != "OK" {
        return Err(ProbeError::NotOk(report.status));
    }
    Ok(report.active_requests)
}

/// Probe one worker.
pub async fn probe_worker(
    client: &HttpClient,
    address: &str,
    path: &str,
    timeout: Duration,
) -> Result<u64, ProbeError> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("http://{}{}", address, path))
        .header("user-agent", "worker-balancer-health-check")
        .body(Body::empty())
        .map_err(|e| ProbeError::Request(e.to_string()))?;

    let exchange = async {
        let response = client
            .request(request)
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;
        let status = response.status();
        let body = axum::body::to_bytes(Body::new(response.into_body()), MAX_REPORT_BYTES)
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;
        interpret(status, &body)
    };

    time::timeout(timeout, exchange)
        .await
        .map_err(|_| ProbeError::Timeout(timeout))?
}

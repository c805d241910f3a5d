//! Registration and diagnostic endpoints.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::response::{bad_request, next_error_response};
use crate::http::server::AppState;
use crate::load_balancer::{HealthState, RegisterOutcome};

#[derive(Debug, Deserialize)]
pub struct WorkerRequest {
    pub server: String,
}

#[derive(Debug, Deserialize)]
pub struct LoadReport {
    pub server: String,
    pub load: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NextServerResponse {
    pub next_server: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkerList {
    pub registered_workers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkerStatus {
    pub address: String,
    pub health: HealthState,
    pub active_requests: u64,
    pub last_checked_secs_ago: u64,
}

#[derive(Debug, Serialize)]
pub struct BalancerHealth {
    pub status: &'static str,
    pub total_workers: usize,
    pub healthy_workers: usize,
    pub workers: Vec<WorkerStatus>,
}

fn message(text: String) -> Json<MessageResponse> {
    Json(MessageResponse { message: text })
}

pub async fn register_worker(
    State(state): State<AppState>,
    Json(req): Json<WorkerRequest>,
) -> Response {
    let server = req.server.trim();
    if server.is_empty() {
        return bad_request("server must not be empty");
    }

    let text = match state.registry.register(server) {
        RegisterOutcome::Added => format!("Worker {} registered successfully", server),
        RegisterOutcome::Refreshed => format!("Worker {} re-registered", server),
    };
    message(text).into_response()
}

pub async fn deregister_worker(
    State(state): State<AppState>,
    Json(req): Json<WorkerRequest>,
) -> Json<MessageResponse> {
    let server = req.server.trim();
    let text = if state.registry.deregister(server) {
        format!("Worker {} deregistered", server)
    } else {
        format!("Worker {} was not registered", server)
    };
    message(text)
}

pub async fn report_load(
    State(state): State<AppState>,
    Json(report): Json<LoadReport>,
) -> Json<MessageResponse> {
    let server = report.server.trim();
    let text = if state.registry.report_load(server, report.load) {
        format!("Load for {} updated to {}", server, report.load)
    } else {
        format!("Worker {} is not registered; report ignored", server)
    };
    message(text)
}

pub async fn next_server(State(state): State<AppState>) -> Response {
    match state.registry.select_next() {
        Ok(worker) => Json(NextServerResponse {
            next_server: worker.address,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Selection requested with no healthy workers");
            next_error_response(e)
        }
    }
}

pub async fn list_workers(State(state): State<AppState>) -> Json<WorkerList> {
    Json(WorkerList {
        registered_workers: state.registry.addresses(),
    })
}

pub async fn balancer_health(State(state): State<AppState>) -> Json<BalancerHealth> {
    let workers = state.registry.snapshot();
    let healthy_workers = workers.iter().filter(|w| w.is_healthy()).count();

    Json(BalancerHealth {
        status: if healthy_workers > 0 { "OK" } else { "DEGRADED" },
        total_workers: workers.len(),
        healthy_workers,
        workers: workers
            .into_iter()
            .map(|w| WorkerStatus {
                last_checked_secs_ago: w.last_checked.elapsed().as_secs(),
                address: w.address,
                health: w.health,
                active_requests: w.active_requests,
            })
            .collect(),
    })
}

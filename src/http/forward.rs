//! Request forwarding.
//!
//! # Responsibilities
//! - Pick a worker through the registry
//! - Relay method, path, query, headers and body to it under a timeout
//! - Pass the worker's response through untouched
//! - Translate failures: unreachable/timeout → 503, anything else → 500

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, Request, Uri},
    response::{IntoResponse, Response},
};
use tokio::time;

use crate::error::ForwardError;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Headers that describe a single connection and must not be relayed.
static HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Catch-all handler proxying to a worker.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().as_str().to_string();
    let path = request.uri().path().to_string();

    tracing::debug!(request_id = %request_id, method = %method, path = %path, "Proxying request");

    match forward(&state, request).await {
        Ok((worker, response)) => {
            metrics::record_request(&method, response.status().as_u16(), &worker, start_time);
            response
        }
        Err(e) => {
            let status = e.status_code();
            match &e {
                ForwardError::Selection(_) => {
                    tracing::warn!(request_id = %request_id, path = %path, "No healthy workers")
                }
                ForwardError::Transport { worker, reason } => tracing::warn!(
                    request_id = %request_id,
                    worker = %worker,
                    error = %reason,
                    "Worker unreachable"
                ),
                ForwardError::Internal(reason) => {
                    tracing::error!(request_id = %request_id, error = %reason, "Forwarding failed")
                }
            }
            let worker = match &e {
                ForwardError::Transport { worker, .. } => worker.as_str(),
                _ => "none",
            };
            metrics::record_request(&method, status.as_u16(), worker, start_time);
            e.into_response()
        }
    }
}

/// Forward one request. Returns the chosen worker's address with its response.
pub async fn forward(
    state: &AppState,
    request: Request<Body>,
) -> Result<(String, Response), ForwardError> {
    let worker = state.registry.select_next()?;
    let address = worker.address;

    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let uri: Uri = format!("http://{}{}", address, path_and_query)
        .parse()
        .map_err(|e| ForwardError::Internal(format!("invalid upstream uri: {}", e)))?;

    let mut upstream = Request::builder()
        .method(parts.method)
        .uri(uri)
        .body(body)
        .map_err(|e| ForwardError::Internal(e.to_string()))?;
    copy_headers(&parts.headers, upstream.headers_mut());

    let result = time::timeout(state.forward_timeout, state.client.request(upstream)).await;
    let response = match result {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => return Err(classify_client_error(address, e)),
        Err(_) => {
            return Err(ForwardError::Transport {
                worker: address,
                reason: format!("no response within {:?}", state.forward_timeout),
            })
        }
    };

    let (parts, body) = response.into_parts();
    Ok((address, Response::from_parts(parts, Body::new(body)).into_response()))
}

fn copy_headers(from: &HeaderMap, to: &mut HeaderMap) {
    for (name, value) in from.iter() {
        // The worker gets a Host matching its own address from the client.
        if *name == header::HOST || HOP_BY_HOP.contains(name) {
            continue;
        }
        to.append(name.clone(), value.clone());
    }
}

/// Connection-level failures are transport errors; a worker speaking broken
/// HTTP, or a failure reading the inbound body, is internal.
fn classify_client_error(worker: String, err: hyper_util::client::legacy::Error) -> ForwardError {
    if !err.is_connect() {
        let hyper_err = std::error::Error::source(&err).and_then(|s| s.downcast_ref::<hyper::Error>());
        if let Some(h) = hyper_err {
            if h.is_parse() || h.is_parse_status() || h.is_user() {
                return ForwardError::Internal(format!("{}: {}", worker, h));
            }
        }
    }
    ForwardError::Transport {
        worker,
        reason: err.to_string(),
    }
}

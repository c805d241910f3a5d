//! Error-to-response mapping.
//!
//! The same registry failure is reported differently depending on the
//! endpoint: the proxy path answers 503, the diagnostic `/next` endpoint
//! answers 500 with a JSON `detail` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{BalancerError, ForwardError};

/// JSON error body used by the management endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let text = status.canonical_reason().unwrap_or("Error");
        (status, text).into_response()
    }
}

/// Response for a failed `/next` selection.
pub fn next_error_response(err: BalancerError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            detail: err.to_string(),
        }),
    )
        .into_response()
}

/// Response for a rejected management request.
pub fn bad_request(detail: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_errors() {
        let resp = ForwardError::from(BalancerError::NoHealthyWorkers).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = ForwardError::Internal("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_next_maps_to_500() {
        let resp = next_error_response(BalancerError::NoHealthyWorkers);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// SPDX-License-Identifier: Apache-2.0

use crate::http::request_tracing::RequestTrace;
use crate::http::response_contract::error_response;
use crate::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;
use canon_api::{ApiError, UNKNOWN_REQUEST_ID};
use tracing::warn;

/// Rejects a declared body above `max_body_bytes` before routing.
pub(crate) async fn body_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<usize>().ok());
    if let Some(len) = declared.filter(|len| *len > state.api.max_body_bytes) {
        let request_id = request
            .extensions()
            .get::<RequestTrace>()
            .map_or(UNKNOWN_REQUEST_ID, |t| t.request_id.as_str())
            .to_string();
        warn!(
            content_length = len,
            max_body_bytes = state.api.max_body_bytes,
            "request body over limit"
        );
        return error_response(
            ApiError::payload_too_large(state.api.max_body_bytes),
            &request_id,
        );
    }
    next.run(request).await
}

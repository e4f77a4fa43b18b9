// SPDX-License-Identifier: Apache-2.0

use crate::http::request_tracing::RequestTrace;
use crate::http::response_contract::envelope_response;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use canon_api::VersionBody;
use std::sync::atomic::Ordering;

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.ready.load(Ordering::Relaxed) {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not-ready")
    }
}

pub(crate) async fn version_handler(Extension(trace): Extension<RequestTrace>) -> Response {
    envelope_response(
        VersionBody {
            name: "canon".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        &trace.request_id,
    )
}

// SPDX-License-Identifier: Apache-2.0

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use canon_api::error_mapping::map_error;
use canon_api::{ApiError, ApiResponseEnvelope};
use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;

#[must_use]
pub(crate) fn api_error_status(err: &ApiError) -> StatusCode {
    StatusCode::from_u16(map_error(err).status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[must_use]
pub(crate) fn api_error_response(status: StatusCode, err: ApiError) -> Response {
    let body = Json(json!({"error": err}));
    let mut resp = (status, body).into_response();
    if status == StatusCode::SERVICE_UNAVAILABLE {
        resp.headers_mut()
            .insert("retry-after", HeaderValue::from_static("3"));
    }
    resp
}

/// Error body stamped with the request's id, status taken from the error code.
#[must_use]
pub(crate) fn error_response(err: ApiError, request_id: &str) -> Response {
    let err = err.with_request_id(request_id);
    api_error_response(api_error_status(&err), err)
}

/// `{data, timestamp, requestId}` with 200.
#[must_use]
pub(crate) fn envelope_response<T: Serialize>(data: T, request_id: &str) -> Response {
    match ApiResponseEnvelope::new(data, request_id, OffsetDateTime::now_utc()) {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => error_response(
            ApiError::internal(format!("response timestamp: {e}")),
            request_id,
        ),
    }
}

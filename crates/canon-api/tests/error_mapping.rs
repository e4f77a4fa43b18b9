// SPDX-License-Identifier: Apache-2.0

use canon_api::error_mapping::{map_error, API_ERROR_SCHEMA_REF};
use canon_api::{ApiError, ApiErrorCode};
use canon_query::{QueryError, QueryErrorCode};
use serde_json::json;

#[test]
fn status_codes_follow_the_error_taxonomy() {
    let cases = [
        (ApiErrorCode::InvalidQueryParameter, 400),
        (ApiErrorCode::InvalidCursor, 400),
        (ApiErrorCode::ValidationFailed, 400),
        (ApiErrorCode::NotFound, 404),
        (ApiErrorCode::PayloadTooLarge, 413),
        (ApiErrorCode::Timeout, 503),
        (ApiErrorCode::NotReady, 503),
        (ApiErrorCode::StoreUnavailable, 503),
        (ApiErrorCode::Internal, 500),
    ];
    for (code, status) in cases {
        let mapped = map_error(&ApiError::new(code, "x", json!({}), "req-1"));
        assert_eq!(mapped.status_code, status, "{code:?}");
        assert_eq!(mapped.schema_ref, API_ERROR_SCHEMA_REF);
    }
}

#[test]
fn query_errors_translate_to_api_codes() {
    let not_found = ApiError::from(QueryError::not_found("module 9 not found"));
    assert_eq!(not_found.code, ApiErrorCode::NotFound);
    assert_eq!(not_found.message, "module 9 not found");

    let validation = ApiError::from(QueryError::validation("layers", "layers must list at least one code"));
    assert_eq!(validation.code, ApiErrorCode::ValidationFailed);
    assert_eq!(validation.details["field_errors"][0]["parameter"], "layers");

    let cursor = ApiError::from(QueryError::new(QueryErrorCode::Cursor, "invalid cursor token \"x\""));
    assert_eq!(cursor.code, ApiErrorCode::InvalidCursor);
    assert_eq!(cursor.message, "invalid cursor token \"x\"");
    assert_eq!(cursor.details["parameter"], "cursor");
}

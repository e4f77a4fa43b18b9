// SPDX-License-Identifier: Apache-2.0

//! Cursor-sliced list endpoints, one per entity type.

use crate::http::request_tracing::RequestTrace;
use crate::http::response_contract::{envelope_response, error_response};
use crate::runtime::store_access::run_read;
use crate::AppState;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::Extension;
use canon_api::{parse_slice_criteria, ParseFilter, QueryParams};
use canon_query::{fetch_slice, Listed};
use tracing::debug;

pub(crate) async fn list_handler<E>(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
    Query(query): Query<QueryParams>,
) -> Response
where
    E: Listed,
    E::Filter: ParseFilter,
{
    let criteria = match parse_slice_criteria::<E>(&query, &state.limits) {
        Ok(criteria) => criteria,
        Err(err) => return error_response(err, &trace.request_id),
    };
    let result = run_read(&state, E::TABLE, move |conn| {
        fetch_slice::<E, E::Filter>(conn, &criteria)
    })
    .await;
    match result {
        Ok(slice) => {
            debug!(
                table = E::TABLE,
                size = slice.size,
                has_next = slice.has_next,
                "slice served"
            );
            envelope_response(slice, &trace.request_id)
        }
        Err(err) => error_response(err, &trace.request_id),
    }
}

// SPDX-License-Identifier: Apache-2.0

//! MCP context endpoints for coding agents, plus the config-file and onboarding lookups.

use crate::http::request_tracing::RequestTrace;
use crate::http::response_contract::{envelope_response, error_response};
use crate::runtime::store_access::run_read;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Extension;
use canon_api::{
    parse_config_files_params, parse_module_context_params, parse_onboarding_params,
    parse_planning_context_params, parse_validation_context_params, ApiError, QueryParams,
};
use canon_query::{config_files, module_context, onboarding, planning_context, validation_context};
use serde::Serialize;

fn respond<T: Serialize>(result: Result<T, ApiError>, trace: &RequestTrace) -> Response {
    match result {
        Ok(data) => envelope_response(data, &trace.request_id),
        Err(err) => error_response(err, &trace.request_id),
    }
}

pub(crate) async fn module_context_handler(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
    Path(module_id): Path<String>,
    Query(query): Query<QueryParams>,
) -> Response {
    let request = match parse_module_context_params(&module_id, &query) {
        Ok(request) => request,
        Err(err) => return error_response(err, &trace.request_id),
    };
    let result = run_read(&state, "mcp.module_context", move |conn| {
        module_context(conn, &request)
    })
    .await;
    respond(result, &trace)
}

pub(crate) async fn planning_context_handler(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
    Query(query): Query<QueryParams>,
) -> Response {
    let request = match parse_planning_context_params(&query) {
        Ok(request) => request,
        Err(err) => return error_response(err, &trace.request_id),
    };
    let result = run_read(&state, "mcp.planning_context", move |conn| {
        planning_context(conn, &request)
    })
    .await;
    respond(result, &trace)
}

pub(crate) async fn validation_context_handler(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
    Query(query): Query<QueryParams>,
) -> Response {
    let request = match parse_validation_context_params(&query) {
        Ok(request) => request,
        Err(err) => return error_response(err, &trace.request_id),
    };
    let result = run_read(&state, "mcp.validation_context", move |conn| {
        validation_context(conn, &request)
    })
    .await;
    respond(result, &trace)
}

pub(crate) async fn config_files_handler(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
    Query(query): Query<QueryParams>,
) -> Response {
    let request = match parse_config_files_params(&query) {
        Ok(request) => request,
        Err(err) => return error_response(err, &trace.request_id),
    };
    let result = run_read(&state, "mcp.config_files", move |conn| {
        config_files(conn, &request)
    })
    .await;
    respond(result, &trace)
}

pub(crate) async fn onboarding_handler(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
    Query(query): Query<QueryParams>,
) -> Response {
    let request = match parse_onboarding_params(&query) {
        Ok(request) => request,
        Err(err) => return error_response(err, &trace.request_id),
    };
    let result = run_read(&state, "mcp.onboarding", move |conn| onboarding(conn, &request)).await;
    respond(result, &trace)
}

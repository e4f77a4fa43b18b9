// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use canon_api::ApiError;
use canon_query::{QueryError, QueryErrorCode};
use canon_store::{ensure_schema_version, open_readonly};
use rusqlite::Connection;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{error, warn};

/// Runs `work` on a fresh read-only connection off the async runtime.
///
/// The open and the queries share `request_timeout`. Store failures are logged here with
/// their cause; the caller only sees the generic `StoreUnavailable` error.
pub(crate) async fn run_read<T, F>(state: &AppState, route: &'static str, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T, QueryError> + Send + 'static,
{
    if !state.ready.load(Ordering::Relaxed) {
        return Err(ApiError::not_ready());
    }
    let path = state.api.db_path.clone();
    let busy_timeout = state.api.sqlite_busy_timeout;
    let started = Instant::now();
    let task = tokio::task::spawn_blocking(move || {
        let conn = open_readonly(&path, busy_timeout)?;
        work(&conn)
    });
    let outcome = timeout(state.api.request_timeout, task).await;

    let elapsed = started.elapsed();
    if elapsed > state.api.slow_query_threshold {
        warn!(
            route,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "slow query detected"
        );
    }

    match outcome {
        Ok(Ok(Ok(value))) => Ok(value),
        Ok(Ok(Err(err))) => {
            if err.code == QueryErrorCode::Store {
                error!(route, error = %err, "store query failed");
            }
            Err(ApiError::from(err))
        }
        Ok(Err(join)) => {
            error!(route, error = %join, "store task aborted");
            Err(ApiError::internal("store task aborted"))
        }
        Err(_) => {
            warn!(route, "request timed out");
            Err(ApiError::timeout(state.api.request_timeout.as_millis()))
        }
    }
}

/// Opens the database once and checks its schema version; readiness follows the outcome.
pub async fn check_store(state: &AppState) -> Result<(), String> {
    let path = state.api.db_path.clone();
    let busy_timeout = state.api.sqlite_busy_timeout;
    let opened = tokio::task::spawn_blocking(move || {
        let conn = open_readonly(&path, busy_timeout)?;
        ensure_schema_version(&conn)
    })
    .await
    .map_err(|e| format!("store check aborted: {e}"))?;
    match opened {
        Ok(()) => {
            state.ready.store(true, Ordering::Relaxed);
            Ok(())
        }
        Err(e) => {
            state.ready.store(false, Ordering::Relaxed);
            Err(format!(
                "open {} failed: {e}",
                state.api.db_path.display()
            ))
        }
    }
}

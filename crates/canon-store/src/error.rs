// SPDX-License-Identifier: Apache-2.0

use canon_model::{CrudError, EntityKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("timestamp format: {0}")]
    TimestampFormat(#[from] time::error::Format),
    #[error("schema version {found} is not supported (expected {expected})")]
    SchemaVersion { found: i64, expected: i64 },
    #[error("{table}: business key column {column} is not a table column")]
    BusinessKey {
        table: &'static str,
        column: &'static str,
    },
    #[error("import of {kind} #{index} failed: {source}")]
    Import {
        kind: EntityKind,
        index: usize,
        #[source]
        source: CrudError,
    },
}

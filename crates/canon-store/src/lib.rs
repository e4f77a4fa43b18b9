// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod error;
mod import;
mod port;
mod schema;
mod table;

pub use error::StoreError;
pub use import::{import_fixture, load_fixture, Fixture, ImportReport};
pub use port::SqlitePort;
pub use schema::{
    apply_schema, ensure_schema_version, open_readonly, open_readwrite, schema_version,
    SQLITE_SCHEMA_VERSION,
};
pub use table::{decode_stored, join_codes, select_list, split_codes, Table};

pub const CRATE_NAME: &str = "canon-store";

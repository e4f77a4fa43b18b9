// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod actions;
mod commands;

pub use actions::ListArgs;
pub use commands::{Cli, Commands, EntityArg};

use canon_model::Timestamp;
use serde_json::Value;

pub const CRATE_NAME: &str = "canon-cli";

/// Runs one parsed command and returns the JSON document to print.
pub fn run(cli: &Cli, now: Timestamp) -> Result<Value, String> {
    let db = cli.db.as_path();
    match &cli.command {
        Commands::Schema => actions::schema(db),
        Commands::Import { fixture } => actions::import(db, fixture, now),
        Commands::List {
            entity,
            size,
            cursor,
            include_deleted,
        } => actions::list(
            db,
            *entity,
            &ListArgs {
                size: *size,
                cursor: cursor.as_deref(),
                include_deleted: *include_deleted,
            },
        ),
        Commands::Delete { entity, id } => actions::delete(db, *entity, *id, now),
        Commands::Update { entity, id, patch } => actions::update(db, *entity, *id, patch, now),
    }
}

/// Renders `value` the way the binary prints it.
pub fn render(value: &Value, compact: bool) -> Result<String, String> {
    if compact {
        serde_json::to_string(value).map_err(|e| e.to_string())
    } else {
        serde_json::to_string_pretty(value).map_err(|e| e.to_string())
    }
}

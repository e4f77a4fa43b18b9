// SPDX-License-Identifier: Apache-2.0

use super::push_in_codes;
use crate::QueryError;
use rusqlite::{params_from_iter, types::Value, Connection};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFilesRequest {
    pub tech_stack_id: i64,
    pub architecture_id: Option<i64>,
    /// Empty means every tool.
    pub tool_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFiles {
    pub config_files: Vec<ConfigFileLeaf>,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFileLeaf {
    pub id: i64,
    pub tool_type: String,
    pub file_path: String,
    pub file_name: String,
    pub description: Option<String>,
    pub template_content: String,
    pub priority: Option<i64>,
}

/// Tool configuration files to generate for a stack, in display order.
///
/// An unknown stack yields an empty list rather than `NotFound`.
pub fn config_files(
    conn: &Connection,
    request: &ConfigFilesRequest,
) -> Result<ConfigFiles, QueryError> {
    let mut where_parts = vec![
        "t.deleted_at IS NULL".to_string(),
        "t.tech_stack_id = ?".to_string(),
    ];
    let mut params = vec![Value::Integer(request.tech_stack_id)];
    if let Some(architecture_id) = request.architecture_id {
        where_parts.push("t.architecture_id = ?".to_string());
        params.push(Value::Integer(architecture_id));
    }
    if !request.tool_types.is_empty() {
        push_in_codes("t.tool_type", &request.tool_types, &mut where_parts, &mut params);
    }
    // NULL display orders sort first, as SQLite orders NULL below every integer
    let sql = format!(
        "SELECT t.id, t.tool_type, t.file_path, t.file_name, t.description, t.content, t.display_order
         FROM config_file_template t
         WHERE {}
         ORDER BY t.display_order ASC, t.id ASC",
        where_parts.join(" AND ")
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let config_files = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            Ok(ConfigFileLeaf {
                id: row.get(0)?,
                tool_type: row.get(1)?,
                file_path: row.get(2)?,
                file_name: row.get(3)?,
                description: row.get(4)?,
                template_content: row.get(5)?,
                priority: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        tech_stack_id = request.tech_stack_id,
        files = config_files.len(),
        "config files assembled"
    );
    Ok(ConfigFiles {
        total_count: config_files.len(),
        config_files,
    })
}

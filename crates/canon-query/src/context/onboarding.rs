// SPDX-License-Identifier: Apache-2.0

use super::push_in_codes;
use crate::QueryError;
use rusqlite::{params_from_iter, types::Value, Connection};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingRequest {
    pub tech_stack_id: i64,
    pub architecture_id: Option<i64>,
    pub context_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Onboarding {
    pub contexts: Vec<OnboardingLeaf>,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingLeaf {
    pub id: i64,
    pub context_type: String,
    pub title: String,
    pub content: String,
    pub priority: i64,
}

pub fn onboarding(
    conn: &Connection,
    request: &OnboardingRequest,
) -> Result<Onboarding, QueryError> {
    let mut where_parts = vec![
        "t.deleted_at IS NULL".to_string(),
        "t.tech_stack_id = ?".to_string(),
    ];
    let mut params = vec![Value::Integer(request.tech_stack_id)];
    if let Some(architecture_id) = request.architecture_id {
        where_parts.push("t.architecture_id = ?".to_string());
        params.push(Value::Integer(architecture_id));
    }
    if !request.context_types.is_empty() {
        push_in_codes(
            "t.context_type",
            &request.context_types,
            &mut where_parts,
            &mut params,
        );
    }
    let sql = format!(
        "SELECT t.id, t.context_type, t.title, t.content, t.priority
         FROM onboarding_context t
         WHERE {}
         ORDER BY t.priority ASC, t.id ASC",
        where_parts.join(" AND ")
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let contexts = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            Ok(OnboardingLeaf {
                id: row.get(0)?,
                context_type: row.get(1)?,
                title: row.get(2)?,
                content: row.get(3)?,
                priority: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        tech_stack_id = request.tech_stack_id,
        contexts = contexts.len(),
        "onboarding contexts assembled"
    );
    Ok(Onboarding {
        total_count: contexts.len(),
        contexts,
    })
}

// SPDX-License-Identifier: Apache-2.0

use super::{push_applies_to_any, push_in_codes, require_codes};
use crate::row_decode::{code_at, codes_at};
use crate::QueryError;
use canon_model::{DetectionType, RuleSeverity};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContextRequest {
    pub tech_stack_id: i64,
    pub architecture_id: i64,
    pub layers: Vec<String>,
    pub class_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationContext {
    pub zero_tolerance_rules: Vec<ValidationZeroToleranceRule>,
    pub checklist_items: Vec<ValidationChecklistItem>,
    pub summary: ValidationSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationZeroToleranceRule {
    pub rule_code: String,
    pub rule_name: String,
    pub layer_code: String,
    pub applies_to: Vec<String>,
    pub detection_pattern: String,
    pub detection_type: DetectionType,
    pub auto_reject_pr: bool,
    pub error_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationChecklistItem {
    pub rule_code: String,
    pub layer_code: String,
    pub check_description: String,
    pub severity: RuleSeverity,
    pub auto_checkable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerCounts {
    pub zero_tolerance: usize,
    pub checklist: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total_zero_tolerance: usize,
    pub total_checklist_items: usize,
    pub auto_checkable_count: usize,
    pub by_layer: BTreeMap<String, LayerCounts>,
}

const ROOT_SQL: &str = "SELECT a.id FROM architecture a
JOIN tech_stack ts ON ts.id = a.tech_stack_id AND ts.deleted_at IS NULL
WHERE a.id = ? AND a.tech_stack_id = ? AND a.deleted_at IS NULL";

// rule -> active convention -> module -> layer, all active
const RULE_SCOPE_JOINS: &str = "JOIN coding_rule r ON r.id = {alias}.rule_id AND r.deleted_at IS NULL
JOIN convention c ON c.id = r.convention_id AND c.active = 1 AND c.deleted_at IS NULL
JOIN module m ON m.id = c.module_id AND m.deleted_at IS NULL
JOIN layer l ON l.id = m.layer_id AND l.deleted_at IS NULL";

fn scope_predicates(
    alias: &str,
    request: &ValidationContextRequest,
) -> (String, String, Vec<Value>) {
    let joins = RULE_SCOPE_JOINS.replace("{alias}", alias);
    let mut where_parts = vec![
        format!("{alias}.deleted_at IS NULL"),
        "l.architecture_id = ?".to_string(),
    ];
    let mut params = vec![Value::Integer(request.architecture_id)];
    push_in_codes("l.code", &request.layers, &mut where_parts, &mut params);
    push_applies_to_any("r.applies_to", &request.class_types, &mut where_parts, &mut params);
    (joins, where_parts.join(" AND "), params)
}

/// Default message for a zero-tolerance rule stored without one.
#[must_use]
pub(crate) fn default_error_message(severity: RuleSeverity, name: &str, code: &str) -> String {
    format!(
        "[{}] {name} violation detected. Rule: {code}",
        severity.as_str()
    )
}

fn load_zero_tolerance(
    conn: &Connection,
    request: &ValidationContextRequest,
) -> Result<Vec<ValidationZeroToleranceRule>, QueryError> {
    let (joins, predicates, params) = scope_predicates("z", request);
    let sql = format!(
        "SELECT r.code, r.name, r.severity, l.code, r.applies_to,
                z.detection_pattern, z.detection_type, z.auto_reject_pr, z.error_message
         FROM zero_tolerance_rule z
         {joins}
         WHERE {predicates}
         ORDER BY l.id ASC, r.id ASC, z.id ASC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            let rule_code: String = row.get(0)?;
            let rule_name: String = row.get(1)?;
            let severity = code_at(row, 2, RuleSeverity::parse)?;
            let stored_message: Option<String> = row.get(8)?;
            let error_message = stored_message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| default_error_message(severity, &rule_name, &rule_code));
            Ok(ValidationZeroToleranceRule {
                layer_code: row.get(3)?,
                applies_to: codes_at(row, 4)?,
                detection_pattern: row.get(5)?,
                detection_type: code_at(row, 6, DetectionType::parse)?,
                auto_reject_pr: row.get(7)?,
                error_message,
                rule_code,
                rule_name,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn load_checklist(
    conn: &Connection,
    request: &ValidationContextRequest,
) -> Result<Vec<ValidationChecklistItem>, QueryError> {
    let (joins, predicates, params) = scope_predicates("ci", request);
    let sql = format!(
        "SELECT r.code, l.code, ci.check_description, r.severity, ci.automation_tool
         FROM checklist_item ci
         {joins}
         WHERE {predicates}
         ORDER BY l.id ASC, r.id ASC, ci.sequence_order ASC, ci.id ASC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            let automation_tool: Option<String> = row.get(4)?;
            Ok(ValidationChecklistItem {
                rule_code: row.get(0)?,
                layer_code: row.get(1)?,
                check_description: row.get(2)?,
                severity: code_at(row, 3, RuleSeverity::parse)?,
                auto_checkable: automation_tool.is_some_and(|t| !t.trim().is_empty()),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Rules a reviewer must enforce on code touching `layers` of one architecture.
pub fn validation_context(
    conn: &Connection,
    request: &ValidationContextRequest,
) -> Result<ValidationContext, QueryError> {
    require_codes("layers", &request.layers)?;
    let mut stmt = conn.prepare_cached(ROOT_SQL)?;
    let root: Option<i64> = stmt
        .query_row(params![request.architecture_id, request.tech_stack_id], |row| {
            row.get(0)
        })
        .optional()?;
    if root.is_none() {
        return Err(QueryError::not_found(format!(
            "architecture {} of tech stack {} not found",
            request.architecture_id, request.tech_stack_id
        )));
    }

    let zero_tolerance_rules = load_zero_tolerance(conn, request)?;
    let checklist_items = load_checklist(conn, request)?;

    let mut by_layer: BTreeMap<String, LayerCounts> = BTreeMap::new();
    for rule in &zero_tolerance_rules {
        by_layer.entry(rule.layer_code.clone()).or_default().zero_tolerance += 1;
    }
    for item in &checklist_items {
        by_layer.entry(item.layer_code.clone()).or_default().checklist += 1;
    }
    let summary = ValidationSummary {
        total_zero_tolerance: zero_tolerance_rules.len(),
        total_checklist_items: checklist_items.len(),
        auto_checkable_count: checklist_items.iter().filter(|i| i.auto_checkable).count(),
        by_layer,
    };
    debug!(
        architecture_id = request.architecture_id,
        zero_tolerance = summary.total_zero_tolerance,
        checklist = summary.total_checklist_items,
        "validation context assembled"
    );
    Ok(ValidationContext {
        zero_tolerance_rules,
        checklist_items,
        summary,
    })
}

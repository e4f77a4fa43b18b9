// SPDX-License-Identifier: Apache-2.0

use super::{push_in_codes, require_codes};
use crate::hierarchy::{GroupIndex, Shell};
use crate::row_decode::codes_at;
use crate::QueryError;
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningContextRequest {
    pub layers: Vec<String>,
    pub tech_stack_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningContext {
    pub tech_stack: TechStackSummary,
    pub architecture: ArchitectureSummary,
    pub layers: Vec<PlanningLayerNode>,
    pub summary: PlanningSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechStackSummary {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureSummary {
    pub id: i64,
    pub name: String,
    pub pattern_description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanningLayerNode {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub modules: GroupIndex<i64, PlanningModuleNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningModuleNode {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub packages: Vec<PackageLeaf>,
    /// Rules of the module's active convention; repeated on every package row.
    #[serde(skip)]
    pub rule_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageLeaf {
    pub id: i64,
    pub path_pattern: String,
    pub description: Option<String>,
    pub allowed_class_types: Vec<String>,
    pub template_count: i64,
    pub rule_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningSummary {
    pub total_modules: usize,
    pub total_packages: usize,
    pub total_templates: i64,
    pub total_rules: i64,
}

const ROOT_SQL: &str = "SELECT ts.id, ts.name, ts.language_type, ts.language_version,
       ts.framework_type, ts.framework_version, a.id, a.name, a.pattern_description
FROM tech_stack ts
JOIN architecture a ON a.id = (
  SELECT MIN(a2.id) FROM architecture a2
  WHERE a2.tech_stack_id = ts.id AND a2.deleted_at IS NULL
)
WHERE ts.deleted_at IS NULL AND (ts.id = ?1 OR (?1 IS NULL AND ts.status = 'ACTIVE'))
ORDER BY ts.id ASC
LIMIT 1";

fn load_root(
    conn: &Connection,
    tech_stack_id: Option<i64>,
) -> Result<Option<(TechStackSummary, ArchitectureSummary)>, QueryError> {
    let mut stmt = conn.prepare_cached(ROOT_SQL)?;
    let root = stmt
        .query_row(params![tech_stack_id], |row| {
            let language: String = row.get(2)?;
            let language_version: String = row.get(3)?;
            let framework: String = row.get(4)?;
            let framework_version: String = row.get(5)?;
            Ok((
                TechStackSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: format!(
                        "{language} {language_version} + {framework} {framework_version}"
                    ),
                },
                ArchitectureSummary {
                    id: row.get(6)?,
                    name: row.get(7)?,
                    pattern_description: row.get(8)?,
                },
            ))
        })
        .optional()?;
    Ok(root)
}

/// One (layer, module, structure) triple; structure columns are NULL for a module without
/// package structures.
struct PlanningRow {
    layer_code: String,
    layer_name: String,
    layer_description: Option<String>,
    module_id: i64,
    module_name: String,
    module_description: Option<String>,
    package: Option<PackageLeaf>,
    rule_count: i64,
}

impl PlanningRow {
    fn decode(row: &Row<'_>) -> rusqlite::Result<Self> {
        let rule_count: i64 = row.get(11)?;
        let package = match row.get::<_, Option<i64>>(6)? {
            Some(id) => {
                let mut allowed_class_types = codes_at(row, 9)?;
                allowed_class_types.sort();
                allowed_class_types.dedup();
                Some(PackageLeaf {
                    id,
                    path_pattern: row.get(7)?,
                    description: row.get(8)?,
                    allowed_class_types,
                    template_count: row.get(10)?,
                    rule_count,
                })
            }
            None => None,
        };
        Ok(Self {
            layer_code: row.get(0)?,
            layer_name: row.get(1)?,
            layer_description: row.get(2)?,
            module_id: row.get(3)?,
            module_name: row.get(4)?,
            module_description: row.get(5)?,
            package,
            rule_count,
        })
    }
}

impl Shell<PlanningRow> for PlanningLayerNode {
    fn from_row(row: &PlanningRow) -> Self {
        Self {
            code: row.layer_code.clone(),
            name: row.layer_name.clone(),
            description: row.layer_description.clone(),
            modules: GroupIndex::new("module"),
        }
    }

    fn matches(&self, row: &PlanningRow) -> bool {
        self.name == row.layer_name && self.description == row.layer_description
    }
}

impl Shell<PlanningRow> for PlanningModuleNode {
    fn from_row(row: &PlanningRow) -> Self {
        Self {
            id: row.module_id,
            name: row.module_name.clone(),
            description: row.module_description.clone(),
            packages: Vec::new(),
            rule_count: row.rule_count,
        }
    }

    fn matches(&self, row: &PlanningRow) -> bool {
        self.name == row.module_name && self.rule_count == row.rule_count
    }
}

fn load_layers(
    conn: &Connection,
    architecture_id: i64,
    layers: &[String],
) -> Result<Vec<PlanningLayerNode>, QueryError> {
    let mut where_parts = vec![
        "l.deleted_at IS NULL".to_string(),
        "l.architecture_id = ?".to_string(),
    ];
    let mut params = vec![Value::Integer(architecture_id)];
    push_in_codes("l.code", layers, &mut where_parts, &mut params);

    let sql = format!(
        "SELECT l.code, l.name, l.description, m.id, m.name, m.description,
                s.id, s.path_pattern, s.description,
                (SELECT GROUP_CONCAT(p.code) FROM package_purpose p
                  WHERE p.structure_id = s.id AND p.deleted_at IS NULL),
                (SELECT COUNT(*) FROM class_template t
                  WHERE t.structure_id = s.id AND t.deleted_at IS NULL),
                (SELECT COUNT(*) FROM coding_rule r
                  WHERE r.deleted_at IS NULL AND r.convention_id = (
                    SELECT MIN(c.id) FROM convention c
                    WHERE c.module_id = m.id AND c.active = 1 AND c.deleted_at IS NULL))
         FROM layer l
         JOIN module m ON m.layer_id = l.id AND m.deleted_at IS NULL
         LEFT JOIN package_structure s ON s.module_id = m.id AND s.deleted_at IS NULL
         WHERE {}
         ORDER BY l.order_index ASC, l.id ASC, m.id ASC, s.id ASC",
        where_parts.join(" AND ")
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), PlanningRow::decode)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut tree: GroupIndex<String, PlanningLayerNode> = GroupIndex::new("layer");
    for row in &rows {
        let layer = tree.entry(row.layer_code.clone(), row);
        let module = layer.modules.entry(row.module_id, row);
        if let Some(package) = &row.package {
            module.packages.push(package.clone());
        }
    }
    Ok(tree.into_nodes())
}

/// Layers, modules and packages an agent may place new code into.
pub fn planning_context(
    conn: &Connection,
    request: &PlanningContextRequest,
) -> Result<PlanningContext, QueryError> {
    require_codes("layers", &request.layers)?;
    let (tech_stack, architecture) = load_root(conn, request.tech_stack_id)?.ok_or_else(|| {
        QueryError::not_found(match request.tech_stack_id {
            Some(id) => format!("tech stack {id} not found"),
            None => "no active tech stack".to_string(),
        })
    })?;
    let layers = load_layers(conn, architecture.id, &request.layers)?;

    let modules = layers.iter().flat_map(|l| l.modules.iter());
    let summary = PlanningSummary {
        total_modules: modules.clone().count(),
        total_packages: modules.clone().map(|m| m.packages.len()).sum(),
        total_templates: modules
            .clone()
            .flat_map(|m| m.packages.iter())
            .map(|p| p.template_count)
            .sum(),
        total_rules: modules.map(|m| m.rule_count).sum(),
    };
    debug!(
        tech_stack_id = tech_stack.id,
        architecture_id = architecture.id,
        modules = summary.total_modules,
        "planning context assembled"
    );
    Ok(PlanningContext {
        tech_stack,
        architecture,
        layers,
        summary,
    })
}

// SPDX-License-Identifier: Apache-2.0

use super::push_applies_to_any;
use crate::hierarchy::{assemble, GroupIndex, Shell};
use crate::row_decode::{code_at, codes_at, optional_code_at};
use crate::QueryError;
use canon_model::{DetectionType, ExampleType, RuleSeverity};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleContextRequest {
    pub module_id: i64,
    pub class_type_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleContext {
    pub module: ModuleSummary,
    pub execution_context: ExecutionContext,
    pub rule_context: RuleContext,
    pub summary: ModuleContextSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub layer: LayerSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSummary {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    pub package_structures: Vec<PackageStructureNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageStructureNode {
    pub id: i64,
    pub path_pattern: String,
    pub description: Option<String>,
    pub purposes: Vec<PurposeLeaf>,
    pub templates: Vec<ClassTemplateLeaf>,
    pub arch_unit_tests: Vec<ArchUnitTestLeaf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurposeLeaf {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassTemplateLeaf {
    pub id: i64,
    pub class_type_code: String,
    pub template_code: String,
    pub naming_pattern: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchUnitTestLeaf {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub test_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleContext {
    pub conventions: Vec<ConventionNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConventionNode {
    pub id: i64,
    pub version: String,
    pub description: Option<String>,
    pub coding_rules: Vec<CodingRuleNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingRuleNode {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub severity: RuleSeverity,
    pub applies_to: Vec<String>,
    pub examples: Vec<ExampleLeaf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero_tolerance: Option<ZeroToleranceLeaf>,
    pub checklist_items: Vec<ChecklistLeaf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleLeaf {
    pub example_type: ExampleType,
    pub code: String,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeroToleranceLeaf {
    pub detection_type: DetectionType,
    pub detection_pattern: String,
    pub auto_reject_pr: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistLeaf {
    pub sequence_order: i64,
    pub check_description: String,
    pub automation_tool: Option<String>,
    pub has_automation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleContextSummary {
    pub total_package_structures: usize,
    pub total_templates: usize,
    pub total_rules: usize,
    pub total_zero_tolerance: usize,
    pub total_arch_tests: usize,
}

struct RootRow {
    module: ModuleSummary,
    convention: Option<(i64, String, Option<String>)>,
}

const ROOT_SQL: &str = "SELECT m.id, m.name, m.description, l.code, l.name, c.id, c.version, c.description
FROM module m
JOIN layer l ON l.id = m.layer_id AND l.deleted_at IS NULL
LEFT JOIN convention c ON c.module_id = m.id AND c.active = 1 AND c.deleted_at IS NULL
WHERE m.id = ? AND m.deleted_at IS NULL
ORDER BY c.id ASC
LIMIT 1";

fn load_root(conn: &Connection, module_id: i64) -> Result<Option<RootRow>, QueryError> {
    let mut stmt = conn.prepare_cached(ROOT_SQL)?;
    let root = stmt
        .query_row(params![module_id], |row| {
            let convention = match row.get::<_, Option<i64>>(5)? {
                Some(id) => Some((id, row.get(6)?, row.get(7)?)),
                None => None,
            };
            Ok(RootRow {
                module: ModuleSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    layer: LayerSummary {
                        code: row.get(3)?,
                        name: row.get(4)?,
                    },
                },
                convention,
            })
        })
        .optional()?;
    Ok(root)
}

/// `None` for an unknown or deleted class type; the rule filter is then skipped.
fn class_type_code(conn: &Connection, class_type_id: i64) -> Result<Option<String>, QueryError> {
    let mut stmt = conn
        .prepare_cached("SELECT code FROM class_type WHERE id = ? AND deleted_at IS NULL")?;
    Ok(stmt
        .query_row(params![class_type_id], |row| row.get(0))
        .optional()?)
}

/// One coding rule joined with its zero-tolerance entry and one of its examples.
struct RuleRow {
    id: i64,
    code: String,
    name: String,
    description: String,
    severity: RuleSeverity,
    applies_to: Vec<String>,
    zero_tolerance: Option<ZeroToleranceLeaf>,
    example: Option<ExampleLeaf>,
}

impl RuleRow {
    fn decode(row: &Row<'_>) -> rusqlite::Result<Self> {
        let zero_tolerance = match optional_code_at(row, 6, DetectionType::parse)? {
            Some(detection_type) => Some(ZeroToleranceLeaf {
                detection_type,
                detection_pattern: row.get(7)?,
                auto_reject_pr: row.get(8)?,
            }),
            None => None,
        };
        let example = match optional_code_at(row, 9, ExampleType::parse)? {
            Some(example_type) => Some(ExampleLeaf {
                example_type,
                code: row.get(10)?,
                explanation: row.get(11)?,
            }),
            None => None,
        };
        Ok(Self {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            severity: code_at(row, 4, RuleSeverity::parse)?,
            applies_to: codes_at(row, 5)?,
            zero_tolerance,
            example,
        })
    }
}

impl Shell<RuleRow> for CodingRuleNode {
    fn from_row(row: &RuleRow) -> Self {
        Self {
            id: row.id,
            code: row.code.clone(),
            name: row.name.clone(),
            description: row.description.clone(),
            severity: row.severity,
            applies_to: row.applies_to.clone(),
            examples: Vec::new(),
            zero_tolerance: row.zero_tolerance.clone(),
            checklist_items: Vec::new(),
        }
    }

    fn matches(&self, row: &RuleRow) -> bool {
        self.code == row.code
            && self.severity == row.severity
            && self.zero_tolerance == row.zero_tolerance
    }
}

fn load_rules(
    conn: &Connection,
    convention_id: i64,
    class_type: Option<&str>,
) -> Result<GroupIndex<i64, CodingRuleNode>, QueryError> {
    let mut where_parts = vec![
        "r.convention_id = ?".to_string(),
        "r.deleted_at IS NULL".to_string(),
    ];
    let mut params = vec![Value::Integer(convention_id)];
    let class_codes: Vec<String> = class_type.map(str::to_string).into_iter().collect();
    push_applies_to_any("r.applies_to", &class_codes, &mut where_parts, &mut params);

    let sql = format!(
        "SELECT r.id, r.code, r.name, r.description, r.severity, r.applies_to,
                z.detection_type, z.detection_pattern, z.auto_reject_pr,
                e.example_type, e.code, e.explanation
         FROM coding_rule r
         LEFT JOIN zero_tolerance_rule z ON z.rule_id = r.id AND z.deleted_at IS NULL
         LEFT JOIN rule_example e ON e.rule_id = r.id AND e.deleted_at IS NULL
         WHERE {}
         ORDER BY r.id ASC, e.id ASC",
        where_parts.join(" AND ")
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), RuleRow::decode)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut rules = assemble("coding_rule", &rows, |r| r.id, |rule: &mut CodingRuleNode, r| {
        if let Some(example) = &r.example {
            rule.examples.push(example.clone());
        }
    });

    let sql = format!(
        "SELECT ci.rule_id, ci.sequence_order, ci.check_description, ci.automation_tool
         FROM checklist_item ci
         JOIN coding_rule r ON r.id = ci.rule_id
         WHERE ci.deleted_at IS NULL AND {}
         ORDER BY ci.rule_id ASC, ci.sequence_order ASC, ci.id ASC",
        where_parts.join(" AND ")
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let mut cursor = stmt.query(params_from_iter(params.iter()))?;
    while let Some(row) = cursor.next()? {
        let rule_id: i64 = row.get(0)?;
        let automation_tool: Option<String> = row.get(3)?;
        let item = ChecklistLeaf {
            sequence_order: row.get(1)?,
            check_description: row.get(2)?,
            has_automation: automation_tool.as_deref().is_some_and(|t| !t.trim().is_empty()),
            automation_tool,
        };
        if let Some(rule) = rules.get_mut(&rule_id) {
            rule.checklist_items.push(item);
        }
    }
    Ok(rules)
}

/// One package structure joined with one of its purposes.
struct StructureRow {
    id: i64,
    path_pattern: String,
    description: Option<String>,
    purpose: Option<PurposeLeaf>,
}

impl Shell<StructureRow> for PackageStructureNode {
    fn from_row(row: &StructureRow) -> Self {
        Self {
            id: row.id,
            path_pattern: row.path_pattern.clone(),
            description: row.description.clone(),
            purposes: Vec::new(),
            templates: Vec::new(),
            arch_unit_tests: Vec::new(),
        }
    }

    fn matches(&self, row: &StructureRow) -> bool {
        self.path_pattern == row.path_pattern && self.description == row.description
    }
}

const STRUCTURE_SQL: &str = "SELECT s.id, s.path_pattern, s.description, p.code, p.name, p.description
FROM package_structure s
LEFT JOIN package_purpose p ON p.structure_id = s.id AND p.deleted_at IS NULL
WHERE s.module_id = ? AND s.deleted_at IS NULL
ORDER BY s.id ASC, p.id ASC";

const TEMPLATE_SQL: &str = "SELECT t.structure_id, t.id, ct.code, t.template_code, t.naming_pattern, t.description
FROM class_template t
JOIN class_type ct ON ct.id = t.class_type_id AND ct.deleted_at IS NULL
JOIN package_structure s ON s.id = t.structure_id AND s.deleted_at IS NULL
WHERE s.module_id = ?1 AND t.deleted_at IS NULL AND (?2 IS NULL OR t.class_type_id = ?2)
ORDER BY t.structure_id ASC, t.id ASC";

const ARCH_TEST_SQL: &str = "SELECT a.structure_id, a.id, a.code, a.name, a.description, a.test_code
FROM arch_unit_test a
JOIN package_structure s ON s.id = a.structure_id AND s.deleted_at IS NULL
WHERE s.module_id = ? AND a.deleted_at IS NULL
ORDER BY a.structure_id ASC, a.id ASC";

struct ExecutionCounts {
    templates: usize,
    arch_tests: usize,
}

fn load_structures(
    conn: &Connection,
    module_id: i64,
    class_type_id: Option<i64>,
) -> Result<(Vec<PackageStructureNode>, ExecutionCounts), QueryError> {
    let mut stmt = conn.prepare_cached(STRUCTURE_SQL)?;
    let rows = stmt
        .query_map(params![module_id], |row| {
            let purpose = match row.get::<_, Option<String>>(3)? {
                Some(code) => Some(PurposeLeaf {
                    code,
                    name: row.get(4)?,
                    description: row.get(5)?,
                }),
                None => None,
            };
            Ok(StructureRow {
                id: row.get(0)?,
                path_pattern: row.get(1)?,
                description: row.get(2)?,
                purpose,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut structures = assemble(
        "package_structure",
        &rows,
        |r| r.id,
        |node: &mut PackageStructureNode, r| {
            if let Some(purpose) = &r.purpose {
                node.purposes.push(purpose.clone());
            }
        },
    );
    let mut counts = ExecutionCounts {
        templates: 0,
        arch_tests: 0,
    };

    let mut stmt = conn.prepare_cached(TEMPLATE_SQL)?;
    let mut cursor = stmt.query(params![module_id, class_type_id])?;
    while let Some(row) = cursor.next()? {
        let structure_id: i64 = row.get(0)?;
        let template = ClassTemplateLeaf {
            id: row.get(1)?,
            class_type_code: row.get(2)?,
            template_code: row.get(3)?,
            naming_pattern: row.get(4)?,
            description: row.get(5)?,
        };
        if let Some(node) = structures.get_mut(&structure_id) {
            node.templates.push(template);
            counts.templates += 1;
        }
    }

    let mut stmt = conn.prepare_cached(ARCH_TEST_SQL)?;
    let mut cursor = stmt.query(params![module_id])?;
    while let Some(row) = cursor.next()? {
        let structure_id: i64 = row.get(0)?;
        let test = ArchUnitTestLeaf {
            id: row.get(1)?,
            code: row.get(2)?,
            name: row.get(3)?,
            description: row.get(4)?,
            test_code: row.get(5)?,
        };
        if let Some(node) = structures.get_mut(&structure_id) {
            node.arch_unit_tests.push(test);
            counts.arch_tests += 1;
        }
    }
    Ok((structures.into_nodes(), counts))
}

/// Everything an agent needs to generate code inside one module.
pub fn module_context(
    conn: &Connection,
    request: &ModuleContextRequest,
) -> Result<ModuleContext, QueryError> {
    let root = load_root(conn, request.module_id)?.ok_or_else(|| {
        QueryError::not_found(format!("module {} not found", request.module_id))
    })?;
    let class_type = match request.class_type_id {
        Some(id) => class_type_code(conn, id)?,
        None => None,
    };

    let mut conventions = Vec::new();
    if let Some((id, version, description)) = root.convention {
        let rules = load_rules(conn, id, class_type.as_deref())?;
        conventions.push(ConventionNode {
            id,
            version,
            description,
            coding_rules: rules.into_nodes(),
        });
    }
    let (package_structures, counts) =
        load_structures(conn, request.module_id, request.class_type_id)?;

    let rules = conventions.iter().flat_map(|c| c.coding_rules.iter());
    let summary = ModuleContextSummary {
        total_package_structures: package_structures.len(),
        total_templates: counts.templates,
        total_rules: rules.clone().count(),
        total_zero_tolerance: rules.filter(|r| r.zero_tolerance.is_some()).count(),
        total_arch_tests: counts.arch_tests,
    };
    debug!(
        module_id = request.module_id,
        rules = summary.total_rules,
        structures = summary.total_package_structures,
        "module context assembled"
    );
    Ok(ModuleContext {
        module: root.module,
        execution_context: ExecutionContext { package_structures },
        rule_context: RuleContext { conventions },
        summary,
    })
}

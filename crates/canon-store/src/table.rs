// SPDX-License-Identifier: Apache-2.0

//! Row codecs: how each entity maps onto its table.

use canon_model::{
    parse_timestamp, ArchUnitTest, Architecture, ChecklistItem, ClassTemplate, ClassType,
    ClassTypeCategory, CodingRule, ConfigFileTemplate, Convention, DependencyType, DetectionType,
    Entity, ExampleType, FeedbackQueue, FeedbackStatus, FeedbackTargetType, FeedbackType, Layer,
    LayerDependencyRule, Lifecycle, Module, OnboardingContext, PackagePurpose, PackageStructure,
    ResourceTemplate, RiskLevel, RuleExample, RuleSeverity, Stored, TechStack, TechStackStatus,
    Timestamp, ValidationError, ZeroToleranceRule,
};
use rusqlite::types::{Type, Value};
use rusqlite::Row;

pub trait Table: Entity {
    const TABLE: &'static str;
    /// Attribute columns, in the order of [`Table::column_values`] and [`Table::decode`].
    const COLUMNS: &'static [&'static str];
    /// Domain ordering column placed before `id`, if the entity has one.
    const ORDER_COLUMN: Option<&'static str> = None;
    /// Columns forming the business key; empty when the entity has none.
    const UNIQUE_KEY: &'static [&'static str];

    fn column_values(&self) -> Vec<Value>;

    fn decode(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self>;
}

/// `alias.id, alias.<columns>.., alias.created_at, alias.updated_at, alias.deleted_at`
#[must_use]
pub fn select_list<E: Table>(alias: &str) -> String {
    let mut cols = Vec::with_capacity(E::COLUMNS.len() + 4);
    cols.push(format!("{alias}.id"));
    cols.extend(E::COLUMNS.iter().map(|c| format!("{alias}.{c}")));
    cols.push(format!("{alias}.created_at"));
    cols.push(format!("{alias}.updated_at"));
    cols.push(format!("{alias}.deleted_at"));
    cols.join(", ")
}

/// Decodes a row selected with [`select_list`].
pub fn decode_stored<E: Table>(row: &Row<'_>) -> rusqlite::Result<Stored<E>> {
    let n = E::COLUMNS.len();
    Ok(Stored {
        id: row.get(0)?,
        entity: E::decode(row, 1)?,
        created_at: timestamp_column(row, n + 1)?,
        updated_at: timestamp_column(row, n + 2)?,
        lifecycle: Lifecycle::from_deleted_at(optional_timestamp_column(row, n + 3)?),
    })
}

fn conversion_failure(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).map_err(|e| conversion_failure(idx, e))
}

fn optional_timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Timestamp>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|r| parse_timestamp(&r).map_err(|e| conversion_failure(idx, e)))
        .transpose()
}

fn code_column<T>(
    row: &Row<'_>,
    idx: usize,
    parse: fn(&str) -> Result<T, ValidationError>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).map_err(|e| conversion_failure(idx, e))
}

fn optional_code_column<T>(
    row: &Row<'_>,
    idx: usize,
    parse: fn(&str) -> Result<T, ValidationError>,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|r| parse(&r).map_err(|e| conversion_failure(idx, e)))
        .transpose()
}

#[must_use]
pub fn join_codes(codes: &[String]) -> String {
    codes.join(",")
}

#[must_use]
pub fn split_codes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn text(v: &str) -> Value {
    Value::Text(v.to_string())
}

fn opt_text(v: Option<&str>) -> Value {
    v.map_or(Value::Null, text)
}

fn int(v: i64) -> Value {
    Value::Integer(v)
}

fn flag(v: bool) -> Value {
    Value::Integer(i64::from(v))
}

impl Table for TechStack {
    const TABLE: &'static str = "tech_stack";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "status",
        "language_type",
        "language_version",
        "framework_type",
        "framework_version",
        "build_tool_type",
    ];
    const UNIQUE_KEY: &'static [&'static str] = &["name"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            text(self.status.as_str()),
            text(&self.language_type),
            text(&self.language_version),
            text(&self.framework_type),
            text(&self.framework_version),
            text(&self.build_tool_type),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(o)?,
            status: code_column(row, o + 1, TechStackStatus::parse)?,
            language_type: row.get(o + 2)?,
            language_version: row.get(o + 3)?,
            framework_type: row.get(o + 4)?,
            framework_version: row.get(o + 5)?,
            build_tool_type: row.get(o + 6)?,
        })
    }
}

impl Table for Architecture {
    const TABLE: &'static str = "architecture";
    const COLUMNS: &'static [&'static str] =
        &["tech_stack_id", "name", "pattern_type", "pattern_description"];
    const UNIQUE_KEY: &'static [&'static str] = &["tech_stack_id", "name"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.tech_stack_id),
            text(&self.name),
            text(&self.pattern_type),
            opt_text(self.pattern_description.as_deref()),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            tech_stack_id: row.get(o)?,
            name: row.get(o + 1)?,
            pattern_type: row.get(o + 2)?,
            pattern_description: row.get(o + 3)?,
        })
    }
}

impl Table for Layer {
    const TABLE: &'static str = "layer";
    const COLUMNS: &'static [&'static str] =
        &["architecture_id", "code", "name", "description", "order_index"];
    const ORDER_COLUMN: Option<&'static str> = Some("order_index");
    const UNIQUE_KEY: &'static [&'static str] = &["architecture_id", "code"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.architecture_id),
            text(&self.code),
            text(&self.name),
            opt_text(self.description.as_deref()),
            int(self.order_index),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            architecture_id: row.get(o)?,
            code: row.get(o + 1)?,
            name: row.get(o + 2)?,
            description: row.get(o + 3)?,
            order_index: row.get(o + 4)?,
        })
    }
}

impl Table for Module {
    const TABLE: &'static str = "module";
    const COLUMNS: &'static [&'static str] = &[
        "layer_id",
        "parent_module_id",
        "name",
        "description",
        "module_path",
    ];
    const UNIQUE_KEY: &'static [&'static str] = &["layer_id", "name"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.layer_id),
            self.parent_module_id.map_or(Value::Null, int),
            text(&self.name),
            opt_text(self.description.as_deref()),
            opt_text(self.module_path.as_deref()),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            layer_id: row.get(o)?,
            parent_module_id: row.get(o + 1)?,
            name: row.get(o + 2)?,
            description: row.get(o + 3)?,
            module_path: row.get(o + 4)?,
        })
    }
}

impl Table for Convention {
    const TABLE: &'static str = "convention";
    const COLUMNS: &'static [&'static str] = &["module_id", "version", "description", "active"];
    const UNIQUE_KEY: &'static [&'static str] = &["module_id", "version"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.module_id),
            text(&self.version),
            opt_text(self.description.as_deref()),
            flag(self.active),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            module_id: row.get(o)?,
            version: row.get(o + 1)?,
            description: row.get(o + 2)?,
            active: row.get(o + 3)?,
        })
    }
}

impl Table for CodingRule {
    const TABLE: &'static str = "coding_rule";
    const COLUMNS: &'static [&'static str] = &[
        "convention_id",
        "code",
        "name",
        "severity",
        "category",
        "description",
        "rationale",
        "auto_fixable",
        "applies_to",
    ];
    const UNIQUE_KEY: &'static [&'static str] = &["convention_id", "code"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.convention_id),
            text(&self.code),
            text(&self.name),
            text(self.severity.as_str()),
            text(&self.category),
            text(&self.description),
            opt_text(self.rationale.as_deref()),
            flag(self.auto_fixable),
            Value::Text(join_codes(&self.applies_to)),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        let applies_to: String = row.get(o + 8)?;
        Ok(Self {
            convention_id: row.get(o)?,
            code: row.get(o + 1)?,
            name: row.get(o + 2)?,
            severity: code_column(row, o + 3, RuleSeverity::parse)?,
            category: row.get(o + 4)?,
            description: row.get(o + 5)?,
            rationale: row.get(o + 6)?,
            auto_fixable: row.get(o + 7)?,
            applies_to: split_codes(&applies_to),
        })
    }
}

impl Table for RuleExample {
    const TABLE: &'static str = "rule_example";
    const COLUMNS: &'static [&'static str] = &["rule_id", "example_type", "code", "explanation"];
    const UNIQUE_KEY: &'static [&'static str] = &[];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.rule_id),
            text(self.example_type.as_str()),
            text(&self.code),
            opt_text(self.explanation.as_deref()),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            rule_id: row.get(o)?,
            example_type: code_column(row, o + 1, ExampleType::parse)?,
            code: row.get(o + 2)?,
            explanation: row.get(o + 3)?,
        })
    }
}

impl Table for ZeroToleranceRule {
    const TABLE: &'static str = "zero_tolerance_rule";
    const COLUMNS: &'static [&'static str] = &[
        "rule_id",
        "detection_type",
        "detection_pattern",
        "auto_reject_pr",
        "error_message",
    ];
    const UNIQUE_KEY: &'static [&'static str] = &["rule_id"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.rule_id),
            text(self.detection_type.as_str()),
            text(&self.detection_pattern),
            flag(self.auto_reject_pr),
            opt_text(self.error_message.as_deref()),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            rule_id: row.get(o)?,
            detection_type: code_column(row, o + 1, DetectionType::parse)?,
            detection_pattern: row.get(o + 2)?,
            auto_reject_pr: row.get(o + 3)?,
            error_message: row.get(o + 4)?,
        })
    }
}

impl Table for ChecklistItem {
    const TABLE: &'static str = "checklist_item";
    const COLUMNS: &'static [&'static str] = &[
        "rule_id",
        "sequence_order",
        "check_description",
        "automation_tool",
        "critical",
    ];
    const UNIQUE_KEY: &'static [&'static str] = &["rule_id", "sequence_order"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.rule_id),
            int(self.sequence_order),
            text(&self.check_description),
            opt_text(self.automation_tool.as_deref()),
            flag(self.critical),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            rule_id: row.get(o)?,
            sequence_order: row.get(o + 1)?,
            check_description: row.get(o + 2)?,
            automation_tool: row.get(o + 3)?,
            critical: row.get(o + 4)?,
        })
    }
}

impl Table for PackageStructure {
    const TABLE: &'static str = "package_structure";
    const COLUMNS: &'static [&'static str] = &["module_id", "path_pattern", "description"];
    const UNIQUE_KEY: &'static [&'static str] = &["module_id", "path_pattern"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.module_id),
            text(&self.path_pattern),
            opt_text(self.description.as_deref()),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            module_id: row.get(o)?,
            path_pattern: row.get(o + 1)?,
            description: row.get(o + 2)?,
        })
    }
}

impl Table for PackagePurpose {
    const TABLE: &'static str = "package_purpose";
    const COLUMNS: &'static [&'static str] = &["structure_id", "code", "name", "description"];
    const UNIQUE_KEY: &'static [&'static str] = &["structure_id", "code"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.structure_id),
            text(&self.code),
            text(&self.name),
            opt_text(self.description.as_deref()),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            structure_id: row.get(o)?,
            code: row.get(o + 1)?,
            name: row.get(o + 2)?,
            description: row.get(o + 3)?,
        })
    }
}

impl Table for ClassTypeCategory {
    const TABLE: &'static str = "class_type_category";
    const COLUMNS: &'static [&'static str] = &["architecture_id", "code", "name", "order_index"];
    const ORDER_COLUMN: Option<&'static str> = Some("order_index");
    const UNIQUE_KEY: &'static [&'static str] = &["architecture_id", "code"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.architecture_id),
            text(&self.code),
            text(&self.name),
            int(self.order_index),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            architecture_id: row.get(o)?,
            code: row.get(o + 1)?,
            name: row.get(o + 2)?,
            order_index: row.get(o + 3)?,
        })
    }
}

impl Table for ClassType {
    const TABLE: &'static str = "class_type";
    const COLUMNS: &'static [&'static str] =
        &["category_id", "code", "name", "description", "order_index"];
    const ORDER_COLUMN: Option<&'static str> = Some("order_index");
    const UNIQUE_KEY: &'static [&'static str] = &["category_id", "code"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.category_id),
            text(&self.code),
            text(&self.name),
            opt_text(self.description.as_deref()),
            int(self.order_index),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            category_id: row.get(o)?,
            code: row.get(o + 1)?,
            name: row.get(o + 2)?,
            description: row.get(o + 3)?,
            order_index: row.get(o + 4)?,
        })
    }
}

impl Table for ClassTemplate {
    const TABLE: &'static str = "class_template";
    const COLUMNS: &'static [&'static str] = &[
        "structure_id",
        "class_type_id",
        "template_code",
        "naming_pattern",
        "description",
    ];
    const UNIQUE_KEY: &'static [&'static str] = &["structure_id", "class_type_id"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.structure_id),
            int(self.class_type_id),
            text(&self.template_code),
            opt_text(self.naming_pattern.as_deref()),
            opt_text(self.description.as_deref()),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            structure_id: row.get(o)?,
            class_type_id: row.get(o + 1)?,
            template_code: row.get(o + 2)?,
            naming_pattern: row.get(o + 3)?,
            description: row.get(o + 4)?,
        })
    }
}

impl Table for ArchUnitTest {
    const TABLE: &'static str = "arch_unit_test";
    const COLUMNS: &'static [&'static str] = &[
        "structure_id",
        "code",
        "name",
        "description",
        "test_code",
        "severity",
    ];
    const UNIQUE_KEY: &'static [&'static str] = &["structure_id", "code"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.structure_id),
            text(&self.code),
            text(&self.name),
            opt_text(self.description.as_deref()),
            text(&self.test_code),
            opt_text(self.severity.map(RuleSeverity::as_str)),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            structure_id: row.get(o)?,
            code: row.get(o + 1)?,
            name: row.get(o + 2)?,
            description: row.get(o + 3)?,
            test_code: row.get(o + 4)?,
            severity: optional_code_column(row, o + 5, RuleSeverity::parse)?,
        })
    }
}

impl Table for LayerDependencyRule {
    const TABLE: &'static str = "layer_dependency_rule";
    const COLUMNS: &'static [&'static str] = &[
        "architecture_id",
        "from_layer",
        "to_layer",
        "dependency_type",
        "condition_description",
    ];
    const UNIQUE_KEY: &'static [&'static str] = &["architecture_id", "from_layer", "to_layer"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.architecture_id),
            text(&self.from_layer),
            text(&self.to_layer),
            text(self.dependency_type.as_str()),
            opt_text(self.condition_description.as_deref()),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            architecture_id: row.get(o)?,
            from_layer: row.get(o + 1)?,
            to_layer: row.get(o + 2)?,
            dependency_type: code_column(row, o + 3, DependencyType::parse)?,
            condition_description: row.get(o + 4)?,
        })
    }
}

impl Table for ResourceTemplate {
    const TABLE: &'static str = "resource_template";
    const COLUMNS: &'static [&'static str] = &[
        "module_id",
        "category",
        "file_path",
        "file_type",
        "description",
        "template_content",
        "required",
    ];
    const UNIQUE_KEY: &'static [&'static str] = &["module_id", "file_path"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.module_id),
            text(&self.category),
            text(&self.file_path),
            text(&self.file_type),
            opt_text(self.description.as_deref()),
            text(&self.template_content),
            flag(self.required),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            module_id: row.get(o)?,
            category: row.get(o + 1)?,
            file_path: row.get(o + 2)?,
            file_type: row.get(o + 3)?,
            description: row.get(o + 4)?,
            template_content: row.get(o + 5)?,
            required: row.get(o + 6)?,
        })
    }
}

// display_order is nullable, so slices page by id alone.
impl Table for ConfigFileTemplate {
    const TABLE: &'static str = "config_file_template";
    const COLUMNS: &'static [&'static str] = &[
        "tech_stack_id",
        "architecture_id",
        "tool_type",
        "file_path",
        "file_name",
        "content",
        "category",
        "description",
        "variables",
        "display_order",
        "required",
    ];
    const UNIQUE_KEY: &'static [&'static str] =
        &["tech_stack_id", "tool_type", "file_path", "file_name"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.tech_stack_id),
            self.architecture_id.map_or(Value::Null, int),
            text(&self.tool_type),
            text(&self.file_path),
            text(&self.file_name),
            text(&self.content),
            opt_text(self.category.as_deref()),
            opt_text(self.description.as_deref()),
            opt_text(self.variables.as_deref()),
            self.display_order.map_or(Value::Null, int),
            flag(self.required),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            tech_stack_id: row.get(o)?,
            architecture_id: row.get(o + 1)?,
            tool_type: row.get(o + 2)?,
            file_path: row.get(o + 3)?,
            file_name: row.get(o + 4)?,
            content: row.get(o + 5)?,
            category: row.get(o + 6)?,
            description: row.get(o + 7)?,
            variables: row.get(o + 8)?,
            display_order: row.get(o + 9)?,
            required: row.get(o + 10)?,
        })
    }
}

impl Table for OnboardingContext {
    const TABLE: &'static str = "onboarding_context";
    const COLUMNS: &'static [&'static str] = &[
        "tech_stack_id",
        "architecture_id",
        "context_type",
        "title",
        "content",
        "priority",
    ];
    const ORDER_COLUMN: Option<&'static str> = Some("priority");
    const UNIQUE_KEY: &'static [&'static str] = &[];

    fn column_values(&self) -> Vec<Value> {
        vec![
            int(self.tech_stack_id),
            self.architecture_id.map_or(Value::Null, int),
            text(&self.context_type),
            text(&self.title),
            text(&self.content),
            int(self.priority),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            tech_stack_id: row.get(o)?,
            architecture_id: row.get(o + 1)?,
            context_type: row.get(o + 2)?,
            title: row.get(o + 3)?,
            content: row.get(o + 4)?,
            priority: row.get(o + 5)?,
        })
    }
}

impl Table for FeedbackQueue {
    const TABLE: &'static str = "feedback_queue";
    const COLUMNS: &'static [&'static str] = &[
        "target_type",
        "target_id",
        "feedback_type",
        "payload",
        "status",
        "risk_level",
        "review_notes",
    ];
    const UNIQUE_KEY: &'static [&'static str] = &[];

    fn column_values(&self) -> Vec<Value> {
        vec![
            text(self.target_type.as_str()),
            self.target_id.map_or(Value::Null, int),
            text(self.feedback_type.as_str()),
            text(&self.payload),
            text(self.status.as_str()),
            text(self.risk_level.as_str()),
            opt_text(self.review_notes.as_deref()),
        ]
    }

    fn decode(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            target_type: code_column(row, o, FeedbackTargetType::parse)?,
            target_id: row.get(o + 1)?,
            feedback_type: code_column(row, o + 2, FeedbackType::parse)?,
            payload: row.get(o + 3)?,
            status: code_column(row, o + 4, FeedbackStatus::parse)?,
            risk_level: code_column(row, o + 5, RiskLevel::parse)?,
            review_notes: row.get(o + 6)?,
        })
    }
}

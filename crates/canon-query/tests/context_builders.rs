// SPDX-License-Identifier: Apache-2.0

use canon_model::{ConfigFileTemplate, CrudService, PackagePurpose, RuleSeverity, Timestamp};
use canon_query::{
    config_files, module_context, onboarding, planning_context, validation_context,
    ConfigFilesRequest, ModuleContextRequest, OnboardingRequest, PlanningContextRequest,
    QueryErrorCode, ValidationContextRequest,
};
use canon_store::{apply_schema, import_fixture, load_fixture, SqlitePort};
use rusqlite::Connection;
use serde_json::json;
use std::path::Path;
use time::macros::datetime;

const T0: Timestamp = datetime!(2024-06-01 09:00 UTC);

fn seeded() -> Connection {
    let mut conn = Connection::open_in_memory().expect("memory db");
    apply_schema(&conn).expect("schema");
    let fixture = load_fixture(Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../fixtures/canon-seed.json"
    )))
    .expect("fixture");
    import_fixture(&mut conn, &fixture, T0).expect("import");
    conn
}

fn codes(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

#[test]
fn module_context_nests_rules_and_structures() {
    let conn = seeded();
    let ctx = module_context(
        &conn,
        &ModuleContextRequest {
            module_id: 1,
            class_type_id: None,
        },
    )
    .expect("context");

    assert_eq!(ctx.module.name, "domain-core");
    assert_eq!(ctx.module.layer.code, "DOMAIN");

    assert_eq!(ctx.rule_context.conventions.len(), 1);
    let convention = &ctx.rule_context.conventions[0];
    assert_eq!(convention.id, 1);
    assert_eq!(convention.version, "1.0.0");
    let rule_codes: Vec<&str> = convention.coding_rules.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(rule_codes, vec!["AGG-001", "VO-001", "DOM-001"]);

    let aggregate_rule = &convention.coding_rules[0];
    assert_eq!(aggregate_rule.severity, RuleSeverity::Critical);
    assert_eq!(aggregate_rule.examples.len(), 2);
    assert!(aggregate_rule.zero_tolerance.is_some());
    let sequence: Vec<i64> = aggregate_rule
        .checklist_items
        .iter()
        .map(|c| c.sequence_order)
        .collect();
    assert_eq!(sequence, vec![1, 2]);
    assert!(aggregate_rule.checklist_items[0].has_automation);
    assert!(!aggregate_rule.checklist_items[1].has_automation);
    assert!(convention.coding_rules[1].zero_tolerance.is_none());

    let structures = &ctx.execution_context.package_structures;
    assert_eq!(structures.len(), 2);
    let purposes: Vec<Vec<&str>> = structures
        .iter()
        .map(|s| s.purposes.iter().map(|p| p.code.as_str()).collect())
        .collect();
    assert_eq!(purposes, vec![vec!["AGGREGATE", "ENTITY"], vec!["VALUE_OBJECT", "ENUM"]]);
    assert_eq!(structures[0].templates[0].class_type_code, "AGGREGATE");
    assert_eq!(structures[0].arch_unit_tests[0].code, "ARCH-AGG-001");
    assert!(structures[1].arch_unit_tests.is_empty());

    let summary = serde_json::to_value(ctx.summary).expect("json");
    assert_eq!(
        summary,
        json!({
            "totalPackageStructures": 2,
            "totalTemplates": 2,
            "totalRules": 3,
            "totalZeroTolerance": 2,
            "totalArchTests": 1
        })
    );
}

#[test]
fn class_type_narrows_rules_and_templates() {
    let conn = seeded();
    let ctx = module_context(
        &conn,
        &ModuleContextRequest {
            module_id: 1,
            class_type_id: Some(2),
        },
    )
    .expect("context");
    let rule_codes: Vec<&str> = ctx.rule_context.conventions[0]
        .coding_rules
        .iter()
        .map(|r| r.code.as_str())
        .collect();
    // DOM-001 has no appliesTo list, so it applies to every class type
    assert_eq!(rule_codes, vec!["VO-001", "DOM-001"]);
    assert_eq!(ctx.summary.total_templates, 1);
    assert!(ctx.execution_context.package_structures[0].templates.is_empty());
    assert_eq!(ctx.execution_context.package_structures[1].templates.len(), 1);
}

#[test]
fn module_without_convention_or_structures_gets_empty_collections() {
    let conn = seeded();
    let ctx = module_context(
        &conn,
        &ModuleContextRequest {
            module_id: 4,
            class_type_id: None,
        },
    )
    .expect("context");
    assert!(ctx.rule_context.conventions.is_empty());
    assert!(ctx.execution_context.package_structures.is_empty());
    assert_eq!(ctx.summary.total_rules, 0);
}

#[test]
fn missing_roots_abort_the_context_build() {
    let conn = seeded();
    let err = module_context(
        &conn,
        &ModuleContextRequest {
            module_id: 999,
            class_type_id: None,
        },
    )
    .expect_err("unknown module");
    assert_eq!(err.code, QueryErrorCode::NotFound);
}

#[test]
fn unknown_class_type_keeps_every_rule_and_drops_templates() {
    let conn = seeded();
    let ctx = module_context(
        &conn,
        &ModuleContextRequest {
            module_id: 1,
            class_type_id: Some(9999),
        },
    )
    .expect("unknown class type is not a missing root");
    assert_eq!(ctx.module.name, "domain-core");
    let rule_codes: Vec<&str> = ctx.rule_context.conventions[0]
        .coding_rules
        .iter()
        .map(|r| r.code.as_str())
        .collect();
    assert_eq!(rule_codes, vec!["AGG-001", "VO-001", "DOM-001"]);
    assert_eq!(ctx.summary.total_rules, 3);
    assert_eq!(ctx.summary.total_templates, 0);
    assert_eq!(ctx.execution_context.package_structures.len(), 2);
}

#[test]
fn deleted_purpose_disappears_from_the_structure() {
    let conn = seeded();
    let port = SqlitePort::new(&conn);
    CrudService::new(&port)
        .soft_delete::<PackagePurpose>(2, T0)
        .expect("delete purpose");
    let ctx = module_context(
        &conn,
        &ModuleContextRequest {
            module_id: 1,
            class_type_id: None,
        },
    )
    .expect("context");
    let purposes: Vec<&str> = ctx.execution_context.package_structures[0]
        .purposes
        .iter()
        .map(|p| p.code.as_str())
        .collect();
    assert_eq!(purposes, vec!["AGGREGATE"]);
}

#[test]
fn planning_context_groups_layers_modules_and_packages() {
    let conn = seeded();
    let ctx = planning_context(
        &conn,
        &PlanningContextRequest {
            layers: codes(&["APPLICATION", "DOMAIN"]),
            tech_stack_id: None,
        },
    )
    .expect("context");

    assert_eq!(ctx.tech_stack.id, 1);
    assert_eq!(ctx.tech_stack.description, "JAVA 21 + SPRING_BOOT 3.5.0");
    assert_eq!(ctx.architecture.name, "Hexagonal");

    let value = serde_json::to_value(&ctx).expect("json");
    assert_eq!(value["layers"][0]["code"], "DOMAIN");
    assert_eq!(value["layers"][1]["code"], "APPLICATION");

    let domain_modules = &value["layers"][0]["modules"];
    assert_eq!(domain_modules[0]["id"], 1);
    assert_eq!(domain_modules[1]["id"], 4);
    assert_eq!(domain_modules[1]["packages"], json!([]));
    assert!(domain_modules[0].get("ruleCount").is_none());
    assert_eq!(
        domain_modules[0]["packages"][1],
        json!({
            "id": 2,
            "pathPattern": "{base}.domain.{bc}.vo",
            "description": "Value objects",
            "allowedClassTypes": ["ENUM", "VALUE_OBJECT"],
            "templateCount": 1,
            "ruleCount": 3
        })
    );

    assert_eq!(
        value["summary"],
        json!({"totalModules": 3, "totalPackages": 3, "totalTemplates": 3, "totalRules": 4})
    );
}

#[test]
fn planning_context_requires_layers_and_a_known_stack() {
    let conn = seeded();
    let err = planning_context(
        &conn,
        &PlanningContextRequest {
            layers: Vec::new(),
            tech_stack_id: None,
        },
    )
    .expect_err("empty layers");
    assert_eq!(err.code, QueryErrorCode::Validation);
    assert_eq!(err.field, Some("layers"));

    let err = planning_context(
        &conn,
        &PlanningContextRequest {
            layers: codes(&["DOMAIN"]),
            tech_stack_id: Some(99),
        },
    )
    .expect_err("unknown stack");
    assert_eq!(err.code, QueryErrorCode::NotFound);
}

#[test]
fn validation_context_lists_enforceable_rules_per_layer() {
    let conn = seeded();
    let ctx = validation_context(
        &conn,
        &ValidationContextRequest {
            tech_stack_id: 1,
            architecture_id: 1,
            layers: codes(&["DOMAIN", "APPLICATION"]),
            class_types: Vec::new(),
        },
    )
    .expect("context");

    let zero_tolerance: Vec<&str> = ctx
        .zero_tolerance_rules
        .iter()
        .map(|z| z.rule_code.as_str())
        .collect();
    assert_eq!(zero_tolerance, vec!["AGG-001", "DOM-001"]);
    assert_eq!(
        ctx.zero_tolerance_rules[0].error_message,
        "Aggregates must not expose setters"
    );
    assert_eq!(
        ctx.zero_tolerance_rules[1].error_message,
        "[BLOCKER] No framework imports in domain violation detected. Rule: DOM-001"
    );
    assert!(ctx.zero_tolerance_rules[1].auto_reject_pr);

    let checklist: Vec<(&str, &str)> = ctx
        .checklist_items
        .iter()
        .map(|c| (c.layer_code.as_str(), c.rule_code.as_str()))
        .collect();
    assert_eq!(
        checklist,
        vec![
            ("DOMAIN", "AGG-001"),
            ("DOMAIN", "AGG-001"),
            ("DOMAIN", "DOM-001"),
            ("APPLICATION", "APP-001"),
        ]
    );

    let summary = serde_json::to_value(&ctx.summary).expect("json");
    assert_eq!(
        summary,
        json!({
            "totalZeroTolerance": 2,
            "totalChecklistItems": 4,
            "autoCheckableCount": 2,
            "byLayer": {
                "APPLICATION": {"zeroTolerance": 0, "checklist": 1},
                "DOMAIN": {"zeroTolerance": 2, "checklist": 3}
            }
        })
    );
}

#[test]
fn validation_context_matches_class_types_as_whole_tokens() {
    let conn = seeded();
    let ctx = validation_context(
        &conn,
        &ValidationContextRequest {
            tech_stack_id: 1,
            architecture_id: 1,
            layers: codes(&["DOMAIN", "APPLICATION"]),
            class_types: codes(&["VALUE"]),
        },
    )
    .expect("context");
    // only the rule without an appliesTo list survives; VALUE is not VALUE_OBJECT
    assert_eq!(ctx.zero_tolerance_rules.len(), 1);
    assert_eq!(ctx.zero_tolerance_rules[0].rule_code, "DOM-001");
    assert_eq!(ctx.summary.total_checklist_items, 1);
}

#[test]
fn validation_context_rejects_architecture_of_another_stack() {
    let conn = seeded();
    let err = validation_context(
        &conn,
        &ValidationContextRequest {
            tech_stack_id: 1,
            architecture_id: 2,
            layers: codes(&["DOMAIN"]),
            class_types: Vec::new(),
        },
    )
    .expect_err("mismatched root");
    assert_eq!(err.code, QueryErrorCode::NotFound);
}

#[test]
fn config_files_follow_display_order_and_skip_deleted_rows() {
    let conn = seeded();
    let request = ConfigFilesRequest {
        tech_stack_id: 1,
        architecture_id: None,
        tool_types: Vec::new(),
    };
    let files = config_files(&conn, &request).expect("config files");
    let names: Vec<&str> = files.config_files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(names, vec!["conventions.mdc", "CLAUDE.md", "archunit.gradle"]);
    assert_eq!(files.total_count, 3);

    // an architecture filter is exact; stack-wide rows without one drop out
    let scoped = config_files(
        &conn,
        &ConfigFilesRequest {
            architecture_id: Some(1),
            tool_types: codes(&["CLAUDE", "CURSOR"]),
            ..request.clone()
        },
    )
    .expect("scoped");
    let ids: Vec<i64> = scoped.config_files.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![1]);

    let port = SqlitePort::new(&conn);
    CrudService::new(&port)
        .soft_delete::<ConfigFileTemplate>(2, T0)
        .expect("delete");
    let files = config_files(&conn, &request).expect("after delete");
    assert_eq!(files.total_count, 2);
    assert_eq!(files.config_files[0].tool_type, "CLAUDE");
}

#[test]
fn onboarding_orders_by_priority_and_tolerates_unknown_stacks() {
    let conn = seeded();
    let ctx = onboarding(
        &conn,
        &OnboardingRequest {
            tech_stack_id: 1,
            architecture_id: None,
            context_types: Vec::new(),
        },
    )
    .expect("onboarding");
    let kinds: Vec<&str> = ctx.contexts.iter().map(|c| c.context_type.as_str()).collect();
    assert_eq!(kinds, vec!["SUMMARY", "ZERO_TOLERANCE", "MCP_USAGE"]);

    let value = serde_json::to_value(&ctx.contexts[0]).expect("json");
    assert_eq!(
        value,
        json!({
            "id": 2,
            "contextType": "SUMMARY",
            "title": "Project summary",
            "content": "Spring Boot 3.5 service on Java 21 with a hexagonal layout.",
            "priority": 1
        })
    );

    let empty = onboarding(
        &conn,
        &OnboardingRequest {
            tech_stack_id: 42,
            architecture_id: None,
            context_types: codes(&["SUMMARY"]),
        },
    )
    .expect("unknown stack is not an error");
    assert!(empty.contexts.is_empty());
    assert_eq!(empty.total_count, 0);
}


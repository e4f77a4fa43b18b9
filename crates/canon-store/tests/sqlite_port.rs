// SPDX-License-Identifier: Apache-2.0

use canon_model::{
    CodingRule, CodingRulePatch, ConfigFileTemplate, CrudError, CrudPort, CrudService, EntityKind,
    FeedbackQueue, FeedbackQueuePatch, FeedbackStatus, Layer, LayerPatch, Lifecycle,
    PackagePurpose, RiskLevel, RuleSeverity, Timestamp,
};
use canon_store::{
    apply_schema, import_fixture, load_fixture, open_readonly, open_readwrite, Fixture,
    SqlitePort, StoreError,
};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;
use time::macros::datetime;

const T0: Timestamp = datetime!(2024-06-01 09:00 UTC);
const T1: Timestamp = datetime!(2024-06-02 09:00 UTC);

fn seed_path() -> &'static Path {
    Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../fixtures/canon-seed.json"
    ))
}

fn seeded() -> Connection {
    let mut conn = Connection::open_in_memory().expect("memory db");
    apply_schema(&conn).expect("schema");
    let fixture = load_fixture(seed_path()).expect("fixture");
    import_fixture(&mut conn, &fixture, T0).expect("import");
    conn
}

#[test]
fn fixture_import_reports_rows_per_kind() {
    let mut conn = Connection::open_in_memory().expect("memory db");
    apply_schema(&conn).expect("schema");
    let fixture = load_fixture(seed_path()).expect("fixture");
    let report = import_fixture(&mut conn, &fixture, T0).expect("import");
    assert_eq!(report.inserted[&EntityKind::Layer], 6);
    assert_eq!(report.inserted[&EntityKind::PackagePurpose], 5);
    assert_eq!(report.inserted[&EntityKind::ConfigFileTemplate], 4);
    assert_eq!(report.inserted[&EntityKind::FeedbackQueue], 2);
    assert_eq!(report.total(), 62);
}

#[test]
fn optional_columns_round_trip_as_null() {
    let conn = seeded();
    let port = SqlitePort::new(&conn);
    let cursor_rules: canon_model::Stored<ConfigFileTemplate> =
        port.find(2).expect("find").expect("row");
    assert_eq!(cursor_rules.entity.tool_type, "CURSOR");
    assert_eq!(cursor_rules.entity.architecture_id, None);
    assert_eq!(cursor_rules.entity.variables, None);
    assert_eq!(cursor_rules.entity.display_order, Some(1));

    let queued: canon_model::Stored<FeedbackQueue> = port.find(1).expect("find").expect("row");
    assert_eq!(queued.entity.status, FeedbackStatus::Pending);
    assert_eq!(queued.entity.risk_level, RiskLevel::Medium);
}

#[test]
fn feedback_review_walks_the_status_pipeline() {
    let conn = seeded();
    let port = SqlitePort::new(&conn);
    let service = CrudService::new(&port);
    let status = |status| FeedbackQueuePatch {
        status: Some(status),
        ..FeedbackQueuePatch::default()
    };

    let outcome = service
        .update::<FeedbackQueue, _>(1, status(FeedbackStatus::LlmApproved), T1)
        .expect("llm approval");
    assert_eq!(outcome.changed, vec!["status"]);

    let err = service
        .update::<FeedbackQueue, _>(1, status(FeedbackStatus::Merged), T1)
        .expect_err("medium risk needs a human");
    assert!(matches!(err, CrudError::Validation(ref e) if e.field == "status"));

    service
        .update::<FeedbackQueue, _>(1, status(FeedbackStatus::HumanApproved), T1)
        .expect("human approval");
    let merged = service
        .update::<FeedbackQueue, _>(1, status(FeedbackStatus::Merged), T1)
        .expect("merge");
    assert_eq!(merged.stored.entity.status, FeedbackStatus::Merged);

    let err = service
        .update::<FeedbackQueue, _>(1, status(FeedbackStatus::Pending), T1)
        .expect_err("merged is terminal");
    assert!(matches!(err, CrudError::Validation(_)));

    // the safe entry was queued already LLM-approved and merges without a human
    service
        .update::<FeedbackQueue, _>(2, status(FeedbackStatus::Merged), T1)
        .expect("auto merge");
}

#[test]
fn stored_rows_decode_with_audit_columns() {
    let conn = seeded();
    let port = SqlitePort::new(&conn);
    let rule: canon_model::Stored<CodingRule> = port.find(1).expect("find").expect("row");
    assert_eq!(rule.entity.code, "AGG-001");
    assert_eq!(rule.entity.severity, RuleSeverity::Critical);
    assert_eq!(rule.entity.applies_to, vec!["AGGREGATE"]);
    assert_eq!(rule.created_at, T0);
    assert_eq!(rule.lifecycle, Lifecycle::Active);

    let missing: Option<canon_model::Stored<Layer>> = port.find(999).expect("find");
    assert!(missing.is_none());
}

#[test]
fn soft_delete_persists_timestamp_and_frees_business_key() {
    let conn = seeded();
    let port = SqlitePort::new(&conn);
    let service = CrudService::new(&port);

    service.soft_delete::<Layer>(6, T1).expect("delete");
    let row: canon_model::Stored<Layer> = port.find(6).expect("find").expect("row");
    assert_eq!(row.lifecycle, Lifecycle::DeletedAt(T1));
    assert_eq!(row.updated_at, T1);

    let again = Layer {
        architecture_id: 1,
        code: "LEGACY".to_string(),
        name: "Legacy again".to_string(),
        description: None,
        order_index: 7,
    };
    assert!(!CrudPort::<Layer>::duplicate_exists(&port, &again, None).expect("dup check"));
    let id = service.create(&again, T1).expect("re-create");
    assert_eq!(id, 7);
}

#[test]
fn duplicate_business_keys_are_rejected_before_insert() {
    let conn = seeded();
    let port = SqlitePort::new(&conn);
    let service = CrudService::new(&port);
    let err = service
        .create(
            &PackagePurpose {
                structure_id: 1,
                code: "AGGREGATE".to_string(),
                name: "Second aggregate".to_string(),
                description: None,
            },
            T1,
        )
        .expect_err("duplicate purpose");
    assert!(matches!(
        err,
        CrudError::Duplicate {
            kind: EntityKind::PackagePurpose
        }
    ));
}

#[test]
fn patch_updates_are_saved_in_place() {
    let conn = seeded();
    let port = SqlitePort::new(&conn);
    let service = CrudService::new(&port);
    let outcome = service
        .update(
            2,
            CodingRulePatch {
                severity: Some(RuleSeverity::Blocker),
                applies_to: Some(vec!["VALUE_OBJECT".to_string(), "ENUM".to_string()]),
                ..CodingRulePatch::default()
            },
            T1,
        )
        .expect("update");
    assert_eq!(outcome.changed, vec!["severity", "appliesTo"]);

    let row: canon_model::Stored<CodingRule> = port.find(2).expect("find").expect("row");
    assert_eq!(row.entity.severity, RuleSeverity::Blocker);
    assert_eq!(row.entity.applies_to, vec!["VALUE_OBJECT", "ENUM"]);
    assert_eq!(row.updated_at, T1);
    assert_eq!(row.created_at, T0);

    let err = service
        .update(
            1,
            LayerPatch {
                code: Some("APPLICATION".to_string()),
                ..LayerPatch::default()
            },
            T1,
        )
        .expect_err("layer 1 cannot take layer 2's code");
    assert!(matches!(err, CrudError::Duplicate { .. }));
}

#[test]
fn dangling_parent_ids_fail_the_whole_import() {
    let mut conn = Connection::open_in_memory().expect("memory db");
    apply_schema(&conn).expect("schema");
    let fixture: Fixture = serde_json::from_str(
        r#"{"layers":[{"architectureId":42,"code":"DOMAIN","name":"Domain","orderIndex":1}]}"#,
    )
    .expect("fixture json");
    let err = import_fixture(&mut conn, &fixture, T0).expect_err("foreign key");
    assert!(matches!(
        err,
        StoreError::Import {
            kind: EntityKind::Layer,
            index: 0,
            source: CrudError::Store(_)
        }
    ));
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM layer", [], |r| r.get(0))
        .expect("count");
    assert_eq!(rows, 0);
}

#[test]
fn readonly_connections_refuse_writes() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("canon.sqlite");
    let mut conn = open_readwrite(&path).expect("open rw");
    let fixture = load_fixture(seed_path()).expect("fixture");
    import_fixture(&mut conn, &fixture, T0).expect("import");
    drop(conn);

    let ro = open_readonly(&path, Duration::from_millis(200)).expect("open ro");
    let port = SqlitePort::new(&ro);
    let err = CrudService::new(&port)
        .soft_delete::<Layer>(1, T1)
        .expect_err("read-only");
    assert!(matches!(err, CrudError::Store(_)));
}

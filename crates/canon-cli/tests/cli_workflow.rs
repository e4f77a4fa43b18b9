// SPDX-License-Identifier: Apache-2.0

use canon_cli::{render, run, Cli};
use canon_model::Timestamp;
use clap::Parser;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use time::macros::datetime;

const T0: Timestamp = datetime!(2024-06-01 09:00 UTC);
const T1: Timestamp = datetime!(2024-06-02 09:00 UTC);

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures/canon-seed.json");

fn canon(db: &Path, args: &[&str], now: Timestamp) -> Result<Value, String> {
    let db = db.display().to_string();
    let mut argv = vec!["canon", "--db", db.as_str()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).map_err(|e| e.to_string())?;
    run(&cli, now)
}

fn imported() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("tmp");
    let db = dir.path().join("canon.sqlite");
    canon(&db, &["schema"], T0).expect("schema");
    let report = canon(&db, &["import", "--fixture", FIXTURE], T0).expect("import");
    assert_eq!(report["inserted"]["layer"], 6);
    assert_eq!(report["inserted"]["tech-stack"], 2);
    assert_eq!(report["inserted"]["feedback-queue"], 2);
    assert_eq!(report["total"], 62);
    (dir, db)
}

fn codes(slice: &Value) -> Vec<String> {
    slice["content"]
        .as_array()
        .expect("content")
        .iter()
        .map(|row| row["code"].as_str().expect("code").to_string())
        .collect()
}

#[test]
fn list_pages_through_the_seeded_layers() {
    let (_dir, db) = imported();
    let first = canon(&db, &["list", "layer", "--size", "2"], T0).expect("first page");
    assert_eq!(codes(&first), vec!["DOMAIN", "APPLICATION"]);
    assert_eq!(first["hasNext"], true);
    assert_eq!(first["nextCursor"], "2");

    let last = canon(&db, &["list", "layer", "--size", "5", "--cursor", "2"], T0).expect("rest");
    assert_eq!(
        codes(&last),
        vec!["PERSISTENCE", "REST_API", "BOOTSTRAP", "LEGACY"]
    );
    assert_eq!(last["hasNext"], false);
    assert!(last.get("nextCursor").is_none());
}

#[test]
fn delete_hides_a_row_unless_deleted_rows_are_requested() {
    let (_dir, db) = imported();
    let deleted = canon(&db, &["delete", "layer", "6"], T1).expect("delete");
    assert_eq!(deleted["code"], "LEGACY");
    assert_eq!(deleted["deletedAt"], "2024-06-02T09:00:00Z");

    let active = canon(&db, &["list", "layer", "--cursor", "4"], T1).expect("active");
    assert_eq!(codes(&active), vec!["BOOTSTRAP"]);
    let all = canon(&db, &["list", "layer", "--cursor", "4", "--include-deleted"], T1)
        .expect("all");
    assert_eq!(codes(&all), vec!["BOOTSTRAP", "LEGACY"]);

    let again = canon(&db, &["delete", "layer", "6"], T1).expect_err("already deleted");
    assert!(again.contains("not found"), "{again}");
}

#[test]
fn update_applies_a_json_patch_and_reports_changed_fields() {
    let (_dir, db) = imported();
    let updated = canon(
        &db,
        &["update", "layer", "1", "--patch", r#"{"name":"Core Domain"}"#],
        T1,
    )
    .expect("update");
    assert_eq!(updated["changed"], json!(["name"]));
    assert_eq!(updated["entity"]["name"], "Core Domain");
    assert_eq!(updated["entity"]["updatedAt"], "2024-06-02T09:00:00Z");

    let err = canon(
        &db,
        &["update", "layer", "1", "--patch", r#"{"colour":"red"}"#],
        T1,
    )
    .expect_err("unknown attribute");
    assert!(err.starts_with("invalid patch"), "{err}");
}

#[test]
fn feedback_status_moves_only_along_the_review_pipeline() {
    let (_dir, db) = imported();
    let err = canon(
        &db,
        &["update", "feedback-queue", "1", "--patch", r#"{"status":"MERGED"}"#],
        T1,
    )
    .expect_err("pending cannot merge");
    assert!(err.contains("validation failed: status"), "{err}");

    let reviewed = canon(
        &db,
        &[
            "update",
            "feedback-queue",
            "1",
            "--patch",
            r#"{"status":"LLM_REJECTED","reviewNotes":"Duplicates VO-001"}"#,
        ],
        T1,
    )
    .expect("llm rejection");
    assert_eq!(reviewed["changed"], json!(["status", "reviewNotes"]));
    assert_eq!(reviewed["entity"]["status"], "LLM_REJECTED");

    let err = canon(
        &db,
        &["update", "feedback-queue", "1", "--patch", r#"{"payload":"{}"}"#],
        T1,
    )
    .expect_err("payload is not patchable");
    assert!(err.starts_with("invalid patch"), "{err}");
}

#[test]
fn bad_sizes_and_missing_databases_are_errors() {
    let (dir, db) = imported();
    let err = canon(&db, &["list", "coding-rule", "--size", "0"], T0).expect_err("size 0");
    assert!(err.contains("size"), "{err}");

    let missing = dir.path().join("absent.sqlite");
    assert!(canon(&missing, &["list", "layer"], T0).is_err());
    assert!(!missing.exists());
}

#[test]
fn compact_rendering_is_single_line() {
    let value = json!({"a": [1, 2]});
    assert_eq!(render(&value, true).expect("compact"), r#"{"a":[1,2]}"#);
    assert!(render(&value, false).expect("pretty").contains('\n'));
}

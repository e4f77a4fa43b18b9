// SPDX-License-Identifier: Apache-2.0

use canon_server::{build_router, check_store, ApiConfig, AppState};
use canon_store::{import_fixture, load_fixture, open_readwrite};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use time::macros::datetime;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn seeded_db(dir: &TempDir) -> PathBuf {
    let db = dir.path().join("canon.sqlite");
    let mut conn = open_readwrite(&db).expect("open sqlite");
    let fixture = load_fixture(Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../fixtures/canon-seed.json"
    )))
    .expect("fixture");
    import_fixture(&mut conn, &fixture, datetime!(2024-06-01 09:00 UTC)).expect("import");
    db
}

async fn start_server(api: ApiConfig) -> std::net::SocketAddr {
    let state = AppState::new(api);
    let _ = check_store(&state).await;
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

async fn seeded_server(dir: &TempDir) -> std::net::SocketAddr {
    start_server(ApiConfig {
        db_path: seeded_db(dir),
        ..ApiConfig::default()
    })
    .await
}

async fn send_raw(
    addr: std::net::SocketAddr,
    path: &str,
    headers: &[(&str, &str)],
) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    req.push_str("\r\n");
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, head.to_string(), body.to_string())
}

fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        k.trim().eq_ignore_ascii_case(name).then_some(v.trim())
    })
}

fn json(body: &str) -> Value {
    serde_json::from_str(body).expect("json body")
}

#[tokio::test]
async fn health_and_readiness_follow_the_store() {
    let dir = tempfile::tempdir().expect("tmp");
    let addr = seeded_server(&dir).await;
    let (status, _, body) = send_raw(addr, "/healthz", &[]).await;
    assert_eq!((status, body.as_str()), (200, "ok"));
    let (status, _, _) = send_raw(addr, "/readyz", &[]).await;
    assert_eq!(status, 200);

    let missing = start_server(ApiConfig {
        db_path: dir.path().join("absent.sqlite"),
        ..ApiConfig::default()
    })
    .await;
    let (status, _, _) = send_raw(missing, "/readyz", &[]).await;
    assert_eq!(status, 503);
    let (status, head, body) = send_raw(missing, "/api/v1/templates/layers", &[]).await;
    assert_eq!(status, 503);
    assert_eq!(header(&head, "retry-after"), Some("3"));
    assert_eq!(json(&body)["error"]["code"], "NotReady");
}

#[tokio::test]
async fn request_ids_are_echoed_or_generated() {
    let dir = tempfile::tempdir().expect("tmp");
    let addr = seeded_server(&dir).await;

    let (status, head, body) =
        send_raw(addr, "/api/v1/version", &[("x-request-id", "req-from-client")]).await;
    assert_eq!(status, 200);
    assert_eq!(header(&head, "x-request-id"), Some("req-from-client"));
    let body = json(&body);
    assert_eq!(body["requestId"], "req-from-client");
    assert_eq!(body["data"]["name"], "canon");
    assert!(body["timestamp"].as_str().is_some_and(|t| t.ends_with('Z')));

    let (_, head, _) = send_raw(addr, "/healthz", &[]).await;
    let generated = header(&head, "x-request-id").expect("generated id");
    assert!(generated.starts_with("req-"));
    assert_eq!(generated.len(), "req-".len() + 16);
}

#[tokio::test]
async fn layer_slices_walk_with_the_next_cursor() {
    let dir = tempfile::tempdir().expect("tmp");
    let addr = seeded_server(&dir).await;

    let mut seen = Vec::new();
    let mut path = "/api/v1/templates/layers?size=4".to_string();
    loop {
        let (status, _, body) = send_raw(addr, &path, &[]).await;
        assert_eq!(status, 200, "{body}");
        let data = json(&body)["data"].clone();
        for layer in data["content"].as_array().expect("content") {
            seen.push(layer["code"].as_str().expect("code").to_string());
        }
        if data["hasNext"] == Value::Bool(false) {
            assert!(data.get("nextCursor").is_none());
            break;
        }
        let cursor = data["nextCursor"].as_str().expect("cursor");
        path = format!("/api/v1/templates/layers?size=4&cursor={cursor}");
    }
    assert_eq!(
        seen,
        vec!["DOMAIN", "APPLICATION", "PERSISTENCE", "REST_API", "BOOTSTRAP", "LEGACY"]
    );
}

#[tokio::test]
async fn list_filters_apply_per_entity() {
    let dir = tempfile::tempdir().expect("tmp");
    let addr = seeded_server(&dir).await;

    let (status, _, body) = send_raw(
        addr,
        "/api/v1/templates/coding-rules?severities=MAJOR",
        &[],
    )
    .await;
    assert_eq!(status, 200);
    let codes: Vec<String> = json(&body)["data"]["content"]
        .as_array()
        .expect("content")
        .iter()
        .map(|r| r["code"].as_str().expect("code").to_string())
        .collect();
    assert_eq!(codes, vec!["VO-001", "APP-001"]);

    let (status, _, body) =
        send_raw(addr, "/api/v1/templates/tech-stacks?status=DEPRECATED", &[]).await;
    assert_eq!(status, 200);
    let content = json(&body)["data"]["content"].clone();
    assert_eq!(content.as_array().map(Vec::len), Some(1));
    assert_eq!(content[0]["id"], 2);
}

#[tokio::test]
async fn bad_parameters_map_to_400_with_the_request_id() {
    let dir = tempfile::tempdir().expect("tmp");
    let addr = seeded_server(&dir).await;

    for (path, code) in [
        ("/api/v1/templates/layers?size=0", "ValidationFailed"),
        ("/api/v1/templates/layers?size=101", "ValidationFailed"),
        ("/api/v1/templates/layers?size=abc", "InvalidQueryParameter"),
        ("/api/v1/templates/layers?cursor=not-a-cursor", "InvalidCursor"),
        ("/api/v1/templates/mcp/planning-context", "InvalidQueryParameter"),
    ] {
        let (status, _, body) = send_raw(addr, path, &[("x-request-id", "req-bad")]).await;
        assert_eq!(status, 400, "{path}: {body}");
        let error = json(&body)["error"].clone();
        assert_eq!(error["code"], code, "{path}");
        assert_eq!(error["requestId"], "req-bad");
    }
}

#[tokio::test]
async fn module_context_route_serves_the_nested_view() {
    let dir = tempfile::tempdir().expect("tmp");
    let addr = seeded_server(&dir).await;

    let (status, _, body) =
        send_raw(addr, "/api/v1/templates/mcp/module/1/context", &[]).await;
    assert_eq!(status, 200, "{body}");
    let data = json(&body)["data"].clone();
    assert_eq!(data["module"]["layer"]["code"], "DOMAIN");
    assert_eq!(data["ruleContext"]["conventions"][0]["codingRules"][0]["code"], "AGG-001");
    assert_eq!(data["summary"]["totalRules"], 3);

    let (status, _, body) =
        send_raw(addr, "/api/v1/templates/mcp/module/999/context", &[]).await;
    assert_eq!(status, 404);
    assert_eq!(json(&body)["error"]["code"], "NotFound");
}

#[tokio::test]
async fn planning_and_validation_contexts_are_served() {
    let dir = tempfile::tempdir().expect("tmp");
    let addr = seeded_server(&dir).await;

    let (status, _, body) = send_raw(
        addr,
        "/api/v1/templates/mcp/planning-context?layers=DOMAIN,APPLICATION",
        &[],
    )
    .await;
    assert_eq!(status, 200, "{body}");
    let data = json(&body)["data"].clone();
    assert_eq!(data["techStack"]["description"], "JAVA 21 + SPRING_BOOT 3.5.0");
    assert_eq!(data["layers"][0]["code"], "DOMAIN");
    assert_eq!(data["summary"]["totalRules"], 4);

    let (status, _, body) = send_raw(
        addr,
        "/api/v1/templates/mcp/validation-context?techStackId=1&architectureId=1&layers=DOMAIN,APPLICATION",
        &[],
    )
    .await;
    assert_eq!(status, 200, "{body}");
    let summary = json(&body)["data"]["summary"].clone();
    assert_eq!(summary["totalZeroTolerance"], 2);
    assert_eq!(summary["byLayer"]["DOMAIN"]["checklist"], 3);

    let (status, _, _) = send_raw(
        addr,
        "/api/v1/templates/mcp/validation-context?techStackId=1&architectureId=2&layers=DOMAIN",
        &[],
    )
    .await;
    assert_eq!(status, 404);
}

fn ids(data: &Value, key: &str) -> Vec<i64> {
    data[key]
        .as_array()
        .expect("array")
        .iter()
        .map(|row| row["id"].as_i64().expect("id"))
        .collect()
}

#[tokio::test]
async fn config_files_and_onboarding_are_listed_in_priority_order() {
    let dir = tempfile::tempdir().expect("tmp");
    let addr = seeded_server(&dir).await;

    let (status, _, body) =
        send_raw(addr, "/api/v1/templates/mcp/config-files?techStackId=1", &[]).await;
    assert_eq!(status, 200, "{body}");
    let data = json(&body)["data"].clone();
    assert_eq!(ids(&data, "configFiles"), vec![2, 1, 3]);
    assert_eq!(data["totalCount"], 3);
    assert_eq!(data["configFiles"][1]["fileName"], "CLAUDE.md");
    assert_eq!(data["configFiles"][1]["priority"], 2);
    assert!(data["configFiles"][1]["templateContent"]
        .as_str()
        .expect("content")
        .starts_with("# Project conventions"));

    let (_, _, body) = send_raw(
        addr,
        "/api/v1/templates/mcp/config-files?techStackId=1&architectureId=1&toolTypes=CLAUDE",
        &[],
    )
    .await;
    assert_eq!(ids(&json(&body)["data"], "configFiles"), vec![1]);

    let (status, _, body) =
        send_raw(addr, "/api/v1/templates/mcp/config-files?techStackId=99", &[]).await;
    assert_eq!(status, 200);
    assert_eq!(json(&body)["data"]["totalCount"], 0);

    let (status, _, body) =
        send_raw(addr, "/api/v1/templates/mcp/onboarding?techStackId=1", &[]).await;
    assert_eq!(status, 200, "{body}");
    let data = json(&body)["data"].clone();
    assert_eq!(ids(&data, "contexts"), vec![2, 1, 3]);
    assert_eq!(data["contexts"][0]["contextType"], "SUMMARY");

    let (_, _, body) = send_raw(
        addr,
        "/api/v1/templates/mcp/onboarding?techStackId=1&architectureId=1&contextTypes=MCP_USAGE",
        &[],
    )
    .await;
    assert_eq!(ids(&json(&body)["data"], "contexts"), vec![3]);

    let (status, _, body) = send_raw(addr, "/api/v1/templates/mcp/onboarding", &[]).await;
    assert_eq!(status, 400);
    assert_eq!(json(&body)["error"]["code"], "InvalidQueryParameter");
}

#[tokio::test]
async fn supporting_aggregates_have_list_routes() {
    let dir = tempfile::tempdir().expect("tmp");
    let addr = seeded_server(&dir).await;

    for (path, expected) in [
        ("/api/v1/templates/layer-dependency-rules?dependencyTypes=FORBIDDEN", vec![2]),
        ("/api/v1/templates/resource-templates?fileTypes=YAML,GRADLE", vec![1, 2]),
        ("/api/v1/templates/config-file-templates?techStackIds=2", vec![4]),
        ("/api/v1/templates/onboarding-contexts?contextTypes=SUMMARY,ZERO_TOLERANCE", vec![2, 1]),
        ("/api/v1/templates/feedback-queue?statuses=PENDING", vec![1]),
    ] {
        let (status, _, body) = send_raw(addr, path, &[]).await;
        assert_eq!(status, 200, "{path}: {body}");
        assert_eq!(ids(&json(&body)["data"], "content"), expected, "{path}");
    }
}


// File-backed loader: concurrent reads, order, skip-and-continue on bad documents

mod common;

use chrono::{DateTime, Utc};
use common::*;
use perfcorr::error::LoadError;
use perfcorr::models::TestRun;
use perfcorr::snapshot_repo::{SnapshotRepo, load_test_run_config_entries, load_test_runs};
use serde_json::json;
use std::path::Path;

fn write(dir: &Path, name: &str, value: &serde_json::Value) {
    std::fs::write(dir.join(name), serde_json::to_vec(value).unwrap()).unwrap();
}

fn run(id: &str, keys: &[&str]) -> TestRun {
    TestRun {
        test_run_id: id.into(),
        application: "shop".into(),
        test_environment: "acme".into(),
        test_type: "loadTest".into(),
        completed: true,
        start: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
        end: None,
        snapshot_keys: keys.iter().map(|k| k.to_string()).collect(),
    }
}

#[tokio::test]
async fn loads_snapshots_in_run_and_key_order() {
    let dir = tempfile::TempDir::new().unwrap();
    for key in ["k1", "k2", "k3"] {
        write(
            dir.path(),
            &format!("{key}.json"),
            &snapshot_payload("JVM", json!([field_panel(1, "Heap", "used", &[1_000], &[1.0])])),
        );
    }
    let repo = SnapshotRepo::new(dir.path(), 2);
    let runs = vec![run("r1", &["k2", "k1"]), run("r2", &["k3"])];
    let snapshots = repo.load_snapshots(&runs).await;
    let keys: Vec<_> = snapshots.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, vec!["k2", "k1", "k3"]);
    assert_eq!(snapshots[2].test_run_id.as_deref(), Some("r2"));
}

#[tokio::test]
async fn invalid_and_missing_snapshots_are_skipped() {
    let dir = tempfile::TempDir::new().unwrap();
    write(
        dir.path(),
        "good.json",
        &snapshot_payload("JVM", json!([empty_panel(1, "Notes")])),
    );
    write(
        dir.path(),
        "bad.json",
        &snapshot_payload("JVM", json!([{"id": 1, "snapshotData": [{"nope": true}]}])),
    );
    std::fs::write(dir.path().join("garbage.json"), b"{not json").unwrap();

    let repo = SnapshotRepo::new(dir.path(), 4);
    let runs = vec![run("r1", &["bad", "good", "missing", "garbage"])];
    let snapshots = repo.load_snapshots(&runs).await;
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].key, "good");
}

#[tokio::test]
async fn load_snapshot_reports_schema_path() {
    let dir = tempfile::TempDir::new().unwrap();
    write(
        dir.path(),
        "bad.json",
        &snapshot_payload("JVM", json!([{"id": 1, "snapshotData": [{"nope": true}]}])),
    );
    let repo = SnapshotRepo::new(dir.path(), 1);
    match repo.load_snapshot("bad", None).await {
        Err(LoadError::Schema { source, .. }) => {
            assert_eq!(source.path, "dashboard.panels[0].snapshotData[0]");
        }
        other => panic!("expected schema error, got {other:?}"),
    }
    assert!(matches!(
        repo.load_snapshot("absent", None).await,
        Err(LoadError::Io { .. })
    ));
}

#[tokio::test]
async fn loads_test_runs_and_config_entries() {
    let dir = tempfile::TempDir::new().unwrap();
    write(
        dir.path(),
        "runs.json",
        &json!([{
            "testRunId": "r1",
            "application": "shop",
            "testEnvironment": "acme",
            "testType": "loadTest",
            "completed": true,
            "start": "2024-03-01T12:00:00Z",
            "snapshotKeys": ["k1"],
            "tags": ["ignored"]
        }]),
    );
    write(
        dir.path(),
        "configs.json",
        &json!([{"testRunId": "r1", "key": "threads", "value": 50}]),
    );
    let runs = load_test_runs(dir.path().join("runs.json")).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].snapshot_keys, vec!["k1"]);
    let entries = load_test_run_config_entries(dir.path().join("configs.json"))
        .await
        .unwrap();
    assert_eq!(entries[0].value, json!(50));
}

// Test-run metadata from the document store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRun {
    pub test_run_id: String,
    pub application: String,
    pub test_environment: String,
    pub test_type: String,
    #[serde(default)]
    pub completed: bool,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub snapshot_keys: Vec<String>,
}

/// One stored `key = value` setting of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunConfigEntry {
    pub test_run_id: String,
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunConfig {
    pub test_run_id: String,
    pub config: BTreeMap<String, Value>,
}

/// Runs and snapshot keys per (application, environment, test type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotCount {
    pub application: String,
    pub test_environment: String,
    pub test_type: String,
    pub test_runs: usize,
    pub snapshots: usize,
}

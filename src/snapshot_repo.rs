// File-backed source of already-fetched inputs: test runs, run configs and raw snapshot
// payloads (one `<key>.json` per snapshot). Snapshots are read concurrently, validated one by
// one, and a failing document is logged and skipped without affecting the others.

use std::path::{Path, PathBuf};

use futures_util::{StreamExt, stream};
use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};

use crate::error::LoadError;
use crate::models::{Snapshot, TestRun, TestRunConfigEntry};
use crate::schema;

pub struct SnapshotRepo {
    dir: PathBuf,
    max_concurrent: usize,
}

impl SnapshotRepo {
    pub fn new(dir: impl Into<PathBuf>, max_concurrent: usize) -> Self {
        Self {
            dir: dir.into(),
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn snapshot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub async fn load_snapshot(
        &self,
        key: &str,
        test_run_id: Option<&str>,
    ) -> Result<Snapshot, LoadError> {
        let path = self.snapshot_path(key);
        let payload: serde_json::Value = read_json(&path).await?;
        schema::validate(payload, key, test_run_id).map_err(|source| LoadError::Schema { path, source })
    }

    /// Every snapshot key of every run, in (run, key) order. Invalid documents are skipped.
    #[instrument(skip(self, runs), fields(dir = %self.dir.display(), runs = runs.len()))]
    pub async fn load_snapshots(&self, runs: &[TestRun]) -> Vec<Snapshot> {
        let jobs: Vec<(&str, &str)> = runs
            .iter()
            .flat_map(|r| {
                r.snapshot_keys
                    .iter()
                    .map(move |k| (k.as_str(), r.test_run_id.as_str()))
            })
            .collect();

        let results: Vec<_> = stream::iter(jobs.iter().copied())
            .map(|(key, run)| async move { (key, self.load_snapshot(key, Some(run)).await) })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let requested = results.len();
        let mut snapshots = Vec::with_capacity(requested);
        for (key, result) in results {
            match result {
                Ok(s) => snapshots.push(s),
                Err(e) => warn!(key, error = %e, "snapshot skipped"),
            }
        }
        info!(
            requested,
            loaded = snapshots.len(),
            "snapshots loaded"
        );
        snapshots
    }
}

pub async fn load_test_runs(path: impl AsRef<Path>) -> Result<Vec<TestRun>, LoadError> {
    read_json(path.as_ref()).await
}

pub async fn load_test_run_config_entries(
    path: impl AsRef<Path>,
) -> Result<Vec<TestRunConfigEntry>, LoadError> {
    read_json(path.as_ref()).await
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

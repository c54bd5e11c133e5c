// Test-run selection per filter group, snapshot counts and per-run config grouping.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::models::{SnapshotCount, TestRun, TestRunConfig, TestRunConfigEntry};

/// One (application, test type, environment) selection of test runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestRunFilter {
    pub application: String,
    pub test_type: String,
    pub test_environment: String,
    #[serde(default = "default_completed_only")]
    pub completed_only: bool,
    /// Keep only the newest N runs.
    #[serde(default)]
    pub limit: Option<usize>,
}

fn default_completed_only() -> bool {
    true
}

impl TestRunFilter {
    /// Suffix used to name the group's outputs, e.g. `shop__loadTest__acme`.
    pub fn name(&self) -> String {
        format!(
            "{}__{}__{}",
            self.application, self.test_type, self.test_environment
        )
    }

    pub fn matches(&self, run: &TestRun) -> bool {
        run.application == self.application
            && run.test_type == self.test_type
            && run.test_environment == self.test_environment
            && (run.completed || !self.completed_only)
    }
}

/// Matching runs, newest start first, truncated to the filter's limit.
pub fn select_test_runs(runs: &[TestRun], filter: &TestRunFilter) -> Vec<TestRun> {
    let mut selected: Vec<TestRun> = runs.iter().filter(|r| filter.matches(r)).cloned().collect();
    selected.sort_by(|a, b| b.start.cmp(&a.start));
    if let Some(limit) = filter.limit {
        selected.truncate(limit);
    }
    selected
}

/// Runs and snapshot keys per (application, environment, test type), sorted by group.
pub fn count_snapshots(runs: &[TestRun]) -> Vec<SnapshotCount> {
    let mut by_group: BTreeMap<(&str, &str, &str), (usize, usize)> = BTreeMap::new();
    for r in runs {
        let entry = by_group
            .entry((
                r.application.as_str(),
                r.test_environment.as_str(),
                r.test_type.as_str(),
            ))
            .or_default();
        entry.0 += 1;
        entry.1 += r.snapshot_keys.len();
    }
    by_group
        .into_iter()
        .map(
            |((application, test_environment, test_type), (test_runs, snapshots))| SnapshotCount {
                application: application.to_string(),
                test_environment: test_environment.to_string(),
                test_type: test_type.to_string(),
                test_runs,
                snapshots,
            },
        )
        .collect()
}

/// Groups `key = value` entries per run (a later entry for the same key wins), optionally
/// restricted to `run_ids`. Ordered by run id.
pub fn group_test_run_configs(
    entries: &[TestRunConfigEntry],
    run_ids: Option<&[String]>,
) -> Vec<TestRunConfig> {
    let wanted: Option<HashSet<&str>> = run_ids.map(|ids| ids.iter().map(String::as_str).collect());
    let mut by_run: BTreeMap<&str, BTreeMap<String, serde_json::Value>> = BTreeMap::new();
    for e in entries {
        if let Some(wanted) = &wanted
            && !wanted.contains(e.test_run_id.as_str())
        {
            continue;
        }
        by_run
            .entry(e.test_run_id.as_str())
            .or_default()
            .insert(e.key.clone(), e.value.clone());
    }
    by_run
        .into_iter()
        .map(|(test_run_id, config)| TestRunConfig {
            test_run_id: test_run_id.to_string(),
            config,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn run(id: &str, app: &str, completed: bool, start_secs: i64, keys: usize) -> TestRun {
        TestRun {
            test_run_id: id.into(),
            application: app.into(),
            test_environment: "acme".into(),
            test_type: "loadTest".into(),
            completed,
            start: DateTime::<Utc>::from_timestamp(start_secs, 0).unwrap(),
            end: None,
            snapshot_keys: (0..keys).map(|i| format!("{id}-{i}")).collect(),
        }
    }

    fn filter(limit: Option<usize>) -> TestRunFilter {
        TestRunFilter {
            application: "shop".into(),
            test_type: "loadTest".into(),
            test_environment: "acme".into(),
            completed_only: true,
            limit,
        }
    }

    #[test]
    fn filter_name_joins_parts() {
        assert_eq!(filter(None).name(), "shop__loadTest__acme");
    }

    #[test]
    fn selects_completed_newest_first() {
        let runs = vec![
            run("r1", "shop", true, 100, 1),
            run("r2", "shop", false, 300, 1),
            run("r3", "shop", true, 200, 1),
            run("r4", "other", true, 400, 1),
        ];
        let ids: Vec<_> = select_test_runs(&runs, &filter(None))
            .into_iter()
            .map(|r| r.test_run_id)
            .collect();
        assert_eq!(ids, vec!["r3", "r1"]);

        let limited = select_test_runs(&runs, &filter(Some(1)));
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].test_run_id, "r3");
    }

    #[test]
    fn counts_runs_and_snapshots_per_group() {
        let runs = vec![
            run("r1", "shop", true, 100, 2),
            run("r2", "shop", true, 200, 3),
            run("r3", "api", true, 300, 1),
        ];
        let counts = count_snapshots(&runs);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].application, "api");
        assert_eq!((counts[1].test_runs, counts[1].snapshots), (2, 5));
    }

    #[test]
    fn groups_config_entries_per_run() {
        let entry = |run: &str, key: &str, value: serde_json::Value| TestRunConfigEntry {
            test_run_id: run.into(),
            key: key.into(),
            value,
        };
        let entries = vec![
            entry("b", "threads", json!(10)),
            entry("a", "heap", json!("2g")),
            entry("b", "threads", json!(20)),
            entry("c", "heap", json!("1g")),
        ];
        let all = group_test_run_configs(&entries, None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].test_run_id, "a");
        assert_eq!(all[1].config["threads"], json!(20));

        let only_b = group_test_run_configs(&entries, Some(&["b".to_string()][..]));
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].test_run_id, "b");
    }
}

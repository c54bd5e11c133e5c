// Composition root: turns the config into a fixed plan (one group per filter group, one job
// per dashboard) and runs the core for each. The core itself never sees filter groups.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::Serialize;
use tracing::{info, instrument};

use crate::aggregation::aggregate;
use crate::assembler::assemble;
use crate::config::AppConfig;
use crate::correlation::{correlate_with, parse_bucket_size};
use crate::models::{
    CorrelationMatrix, RunTable, Snapshot, SnapshotCount, SnapshotTable, TestRun, TestRunConfig,
    TestRunConfigEntry, WideTable,
};
use crate::pivot::pivot;
use crate::selection::{TestRunFilter, count_snapshots, group_test_run_configs, select_test_runs};
use crate::snapshot_repo::SnapshotRepo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardJob {
    pub shortname: String,
    pub title: String,
    pub wide_output: String,
    pub correlation_output: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPlan {
    pub name: String,
    pub filter: TestRunFilter,
    pub snapshots_output: String,
    pub configs_output: String,
    pub dashboards: Vec<DashboardJob>,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    groups: Vec<GroupPlan>,
    bucket_size: TimeDelta,
}

#[derive(Debug, Clone)]
pub struct DashboardOutput {
    pub job: DashboardJob,
    pub wide: WideTable,
    pub correlation: CorrelationMatrix,
}

#[derive(Debug, Clone)]
pub struct GroupOutput {
    pub plan: GroupPlan,
    pub test_run_ids: Vec<String>,
    pub run_table: RunTable,
    pub test_run_configs: Vec<TestRunConfig>,
    pub dashboards: Vec<DashboardOutput>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub snapshot_counts: Vec<SnapshotCount>,
    pub groups: Vec<GroupOutput>,
}

pub const SNAPSHOT_COUNTS_OUTPUT: &str = "df_counts_per_test_run";

impl Pipeline {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let bucket_size = parse_bucket_size(&config.correlation.bucket_size)?;
        let groups = config
            .filter_groups
            .iter()
            .map(|g| {
                let name = g.filter.name();
                let dashboards = g
                    .dashboards
                    .iter()
                    .map(|(shortname, title)| DashboardJob {
                        shortname: shortname.clone(),
                        title: title.clone(),
                        wide_output: format!("df_wide_metrics__{shortname}__{name}"),
                        correlation_output: format!("dashboard_correlation__{shortname}__{name}"),
                    })
                    .collect();
                GroupPlan {
                    snapshots_output: format!("df_grafana_snapshots__{name}"),
                    configs_output: format!("test_run_configs__{name}"),
                    filter: g.filter.clone(),
                    name,
                    dashboards,
                }
            })
            .collect();
        Ok(Self {
            groups,
            bucket_size,
        })
    }

    pub fn groups(&self) -> &[GroupPlan] {
        &self.groups
    }

    pub fn bucket_size(&self) -> TimeDelta {
        self.bucket_size
    }

    /// Core for one group over snapshots already loaded for `runs`.
    #[instrument(skip_all, fields(group = %group.name, snapshots = snapshots.len()))]
    pub fn run_group(
        &self,
        group: &GroupPlan,
        runs: &[TestRun],
        snapshots: &[Snapshot],
        config_entries: &[TestRunConfigEntry],
    ) -> GroupOutput {
        let tables: Vec<SnapshotTable> = snapshots.iter().map(assemble).collect();
        let run_table = aggregate(&tables);
        let test_run_ids: Vec<String> = runs.iter().map(|r| r.test_run_id.clone()).collect();
        let test_run_configs = group_test_run_configs(config_entries, Some(test_run_ids.as_slice()));

        let dashboards = group
            .dashboards
            .iter()
            .map(|job| {
                let wide = pivot(&run_table, &job.title);
                let correlation = correlate_with(&wide, self.bucket_size);
                info!(
                    dashboard = %job.title,
                    rows = wide.rows.len(),
                    columns = wide.columns.len(),
                    correlated = correlation.len(),
                    "dashboard correlated"
                );
                DashboardOutput {
                    job: job.clone(),
                    wide,
                    correlation,
                }
            })
            .collect();

        GroupOutput {
            plan: group.clone(),
            test_run_ids,
            run_table,
            test_run_configs,
            dashboards,
        }
    }

    /// Selects runs per group, loads their snapshots through `repo` and runs every group.
    pub async fn execute(
        &self,
        repo: &SnapshotRepo,
        runs: &[TestRun],
        config_entries: &[TestRunConfigEntry],
    ) -> PipelineOutput {
        let mut groups = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let selected = select_test_runs(runs, &group.filter);
            info!(group = %group.name, runs = selected.len(), "test runs selected");
            let snapshots = repo.load_snapshots(&selected).await;
            groups.push(self.run_group(group, &selected, &snapshots, config_entries));
        }
        PipelineOutput {
            snapshot_counts: count_snapshots(runs),
            groups,
        }
    }
}

impl PipelineOutput {
    /// Writes every named output as `<dir>/<name>.json`; returns the written paths.
    pub fn write_to(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = vec![write_json(dir, SNAPSHOT_COUNTS_OUTPUT, &self.snapshot_counts)?];
        for g in &self.groups {
            written.push(write_json(dir, &g.plan.snapshots_output, &g.run_table)?);
            written.push(write_json(dir, &g.plan.configs_output, &g.test_run_configs)?);
            for d in &g.dashboards {
                written.push(write_json(dir, &d.job.wide_output, &d.wide)?);
                written.push(write_json(dir, &d.job.correlation_output, &d.correlation)?);
            }
        }
        Ok(written)
    }
}

fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("{name}.json"));
    let mut writer = BufWriter::new(std::fs::File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(path)
}

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::correlation::{DEFAULT_BUCKET_SIZE, parse_bucket_size};
use crate::selection::TestRunFilter;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub correlation: CorrelationConfig,
    pub filter_groups: Vec<FilterGroupConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// JSON array of test-run documents.
    pub test_runs: String,
    /// JSON array of `{testRunId, key, value}` entries.
    #[serde(default)]
    pub test_run_configs: Option<String>,
    /// Directory holding one `<snapshot key>.json` per fetched snapshot.
    pub snapshots_dir: String,
    #[serde(default = "default_max_concurrent_reads")]
    pub max_concurrent_reads: usize,
}

fn default_max_concurrent_reads() -> usize {
    16
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorrelationConfig {
    #[serde(default = "default_bucket_size")]
    pub bucket_size: String,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            bucket_size: default_bucket_size(),
        }
    }
}

fn default_bucket_size() -> String {
    DEFAULT_BUCKET_SIZE.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterGroupConfig {
    #[serde(flatten)]
    pub filter: TestRunFilter,
    /// Short name -> dashboard title to correlate.
    #[serde(default)]
    pub dashboards: BTreeMap<String, String>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "perfcorr.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.input.test_runs.is_empty(),
            "input.test_runs must be non-empty"
        );
        anyhow::ensure!(
            !self.input.snapshots_dir.is_empty(),
            "input.snapshots_dir must be non-empty"
        );
        if let Some(path) = &self.input.test_run_configs {
            anyhow::ensure!(
                !path.is_empty(),
                "input.test_run_configs must be non-empty when set"
            );
        }
        anyhow::ensure!(
            self.input.max_concurrent_reads > 0,
            "input.max_concurrent_reads must be > 0, got {}",
            self.input.max_concurrent_reads
        );
        anyhow::ensure!(!self.output.dir.is_empty(), "output.dir must be non-empty");
        if let Err(e) = parse_bucket_size(&self.correlation.bucket_size) {
            anyhow::bail!("correlation.bucket_size is invalid: {}", e);
        }
        anyhow::ensure!(
            !self.filter_groups.is_empty(),
            "filter_groups must contain at least one group"
        );
        for (i, group) in self.filter_groups.iter().enumerate() {
            let f = &group.filter;
            anyhow::ensure!(
                !f.application.is_empty(),
                "filter_groups[{}].application must be non-empty",
                i
            );
            anyhow::ensure!(
                !f.test_type.is_empty(),
                "filter_groups[{}].test_type must be non-empty",
                i
            );
            anyhow::ensure!(
                !f.test_environment.is_empty(),
                "filter_groups[{}].test_environment must be non-empty",
                i
            );
            anyhow::ensure!(
                f.limit != Some(0),
                "filter_groups[{}].limit must be > 0 when set",
                i
            );
            for (shortname, title) in &group.dashboards {
                anyhow::ensure!(
                    !title.is_empty(),
                    "filter_groups[{}].dashboards.{} must be non-empty",
                    i,
                    shortname
                );
            }
        }
        Ok(())
    }
}

use anyhow::Result;
use perfcorr::*;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();
    tracing::info!("{} {}", version::NAME, version::VERSION);

    let app_config = config::AppConfig::load()?;
    let pipeline = pipeline::Pipeline::from_config(&app_config)?;

    let test_runs = snapshot_repo::load_test_runs(&app_config.input.test_runs).await?;
    let config_entries = match &app_config.input.test_run_configs {
        Some(path) => snapshot_repo::load_test_run_config_entries(path).await?,
        None => Vec::new(),
    };
    tracing::info!(
        test_runs = test_runs.len(),
        config_entries = config_entries.len(),
        groups = pipeline.groups().len(),
        "inputs loaded"
    );

    let repo = snapshot_repo::SnapshotRepo::new(
        &app_config.input.snapshots_dir,
        app_config.input.max_concurrent_reads,
    );
    let output = pipeline.execute(&repo, &test_runs, &config_entries).await;
    let written = output.write_to(Path::new(&app_config.output.dir))?;
    tracing::info!(
        outputs = written.len(),
        dir = %app_config.output.dir,
        "outputs written"
    );

    Ok(())
}

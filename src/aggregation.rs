// Run aggregator: concatenates snapshot tables and enriches every record with its run's
// start time and elapsed offset. Grouped enrichment, not a reduction: every record survives.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{RunRecord, RunTable, SnapshotTable};

/// Records without a test run id share one partition.
pub fn aggregate(tables: &[SnapshotTable]) -> RunTable {
    let mut start_by_run: HashMap<Option<&str>, DateTime<Utc>> = HashMap::new();
    for r in tables.iter().flat_map(|t| &t.records) {
        start_by_run
            .entry(r.test_run_id.as_deref())
            .and_modify(|start| *start = (*start).min(r.record.time))
            .or_insert(r.record.time);
    }

    let records = tables
        .iter()
        .flat_map(|t| &t.records)
        .map(|r| {
            let start_time = start_by_run
                .get(&r.test_run_id.as_deref())
                .copied()
                .unwrap_or(r.record.time);
            RunRecord {
                record: r.clone(),
                start_time,
                timestep: r.record.time - start_time,
            }
        })
        .collect();

    RunTable { records }
}

// Snapshot assembler: all data-bearing panels of one snapshot -> one annotated table.

use tracing::debug;

use crate::flatten::flatten;
use crate::models::{Snapshot, SnapshotRecord, SnapshotTable};

/// Concatenates flattened panels in panel order. A snapshot without data-bearing panels
/// yields an empty table.
pub fn assemble(snapshot: &Snapshot) -> SnapshotTable {
    let dashboard = &snapshot.dashboard;
    let records: Vec<SnapshotRecord> = dashboard
        .panels
        .iter()
        .filter(|p| p.has_data)
        .flat_map(flatten)
        .map(|record| SnapshotRecord {
            record,
            key: snapshot.key.clone(),
            test_run_id: snapshot.test_run_id.clone(),
            dashboard_title: dashboard.title.clone(),
            dashboard_id: dashboard.id,
        })
        .collect();

    debug!(
        key = %snapshot.key,
        dashboard = %dashboard.title,
        records = records.len(),
        "snapshot assembled"
    );
    SnapshotTable { records }
}

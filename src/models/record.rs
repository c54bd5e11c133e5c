// Long-format records: flattened panel points, snapshot-annotated, run-annotated.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, Serializer};

/// One (time, metric, value) observation from a single panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRecord {
    pub panel_id: i64,
    pub time: DateTime<Utc>,
    pub panel_title: Option<String>,
    pub metric_name: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    #[serde(flatten)]
    pub record: FlatRecord,
    pub key: String,
    pub test_run_id: Option<String>,
    pub dashboard_title: String,
    pub dashboard_id: i64,
}

/// All records of one snapshot, panel order preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotTable {
    pub records: Vec<SnapshotRecord>,
}

impl SnapshotTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    #[serde(flatten)]
    pub record: SnapshotRecord,
    pub start_time: DateTime<Utc>,
    #[serde(serialize_with = "serialize_seconds")]
    pub timestep: TimeDelta,
}

impl RunRecord {
    pub fn time(&self) -> DateTime<Utc> {
        self.record.record.time
    }
}

/// Long table across all snapshots of a test-run selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunTable {
    pub records: Vec<RunRecord>,
}

impl RunTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Durations go over the wire as fractional seconds.
pub(crate) fn serialize_seconds<S: Serializer>(d: &TimeDelta, s: S) -> Result<S::Ok, S::Error> {
    let secs = d.num_seconds() as f64 + f64::from(d.subsec_nanos()) / 1e9;
    s.serialize_f64(secs)
}

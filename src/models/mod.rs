// Domain models: snapshot payloads, long records, wide tables, test-run metadata

mod record;
mod snapshot;
mod table;
mod test_run;

pub use record::{FlatRecord, RunRecord, RunTable, SnapshotRecord, SnapshotTable};
pub use snapshot::{
    Dashboard, FieldConfig, FieldSeries, FieldType, FieldValue, Panel, PointSeries, SeriesField,
    Snapshot, SnapshotData, SnapshotMeta, TableData, time_from_epoch_millis,
};
pub use table::{CorrelationMatrix, WideRow, WideTable};
pub use test_run::{SnapshotCount, TestRun, TestRunConfig, TestRunConfigEntry};

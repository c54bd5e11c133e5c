// Panel flattener: one panel's series payload -> flat (time, metric, value) records.

use tracing::{error, warn};

use crate::models::{
    FieldSeries, FieldType, FieldValue, FlatRecord, Panel, PointSeries, SnapshotData,
    time_from_epoch_millis,
};

/// Metric name used when the number field carries no display name.
pub const UNKNOWN_METRIC: &str = "unknown";

/// Flattens every series entry of `panel`, in order. Malformed field series and tables are
/// skipped (logged) without affecting the other entries.
pub fn flatten(panel: &Panel) -> Vec<FlatRecord> {
    let mut records = Vec::new();
    for data in &panel.snapshot_data {
        match data {
            SnapshotData::Fields(series) => flatten_fields(panel, series, &mut records),
            SnapshotData::Points(series) => flatten_points(panel, series, &mut records),
            SnapshotData::Table(_) => {
                error!(
                    panel_id = panel.id,
                    panel = panel.title.as_deref().unwrap_or_default(),
                    "table series not supported, skipped"
                );
            }
        }
    }
    records
}

fn flatten_fields(panel: &Panel, series: &FieldSeries, out: &mut Vec<FlatRecord>) {
    let time_fields: Vec<_> = series
        .fields
        .iter()
        .filter(|f| f.field_type == FieldType::Time)
        .collect();
    let number_fields: Vec<_> = series
        .fields
        .iter()
        .filter(|f| f.field_type == FieldType::Number)
        .collect();

    let ([time_field], [number_field]) = (time_fields.as_slice(), number_fields.as_slice()) else {
        warn!(
            panel_id = panel.id,
            panel = panel.title.as_deref().unwrap_or_default(),
            time_fields = time_fields.len(),
            number_fields = number_fields.len(),
            "series skipped: expected exactly 1 time field and 1 number field"
        );
        return;
    };

    let metric_name = number_field
        .config
        .display_name_from_ds
        .clone()
        .unwrap_or_else(|| UNKNOWN_METRIC.to_string());

    for (t, v) in time_field.values.iter().zip(&number_field.values) {
        // string, missing or unrepresentable timestamps are dropped per point
        let Some(time) = t.as_ref().and_then(|t| match t {
            FieldValue::Number(millis) => time_from_epoch_millis(*millis),
            FieldValue::Text(_) => None,
        }) else {
            continue;
        };
        out.push(FlatRecord {
            panel_id: panel.id,
            time,
            panel_title: panel.title.clone(),
            metric_name: metric_name.clone(),
            value: v.as_ref().and_then(FieldValue::as_f64),
        });
    }
}

// No null filtering here, unlike field series. Only timestamps outside the date range go.
fn flatten_points(panel: &Panel, series: &PointSeries, out: &mut Vec<FlatRecord>) {
    let before = out.len();
    out.extend(series.datapoints.iter().filter_map(|(value, millis)| {
        Some(FlatRecord {
            panel_id: panel.id,
            time: time_from_epoch_millis(*millis)?,
            panel_title: panel.title.clone(),
            metric_name: series.alias.clone(),
            value: value.filter(|v| v.is_finite()),
        })
    }));
    let dropped = series.datapoints.len() - (out.len() - before);
    if dropped > 0 {
        warn!(
            panel_id = panel.id,
            alias = %series.alias,
            dropped,
            "datapoints with unrepresentable timestamps dropped"
        );
    }
}

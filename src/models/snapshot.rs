// Dashboard snapshot payload: dashboard, panels and the three series encodings.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One validated dashboard capture, tagged with the key and run it was fetched under.
/// Only built by `schema::validate`, which derives each panel's `has_data`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub key: String,
    pub test_run_id: Option<String>,
    pub dashboard: Dashboard,
    pub meta: SnapshotMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    pub is_snapshot: bool,
    pub version: i64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: i64,
    pub title: String,
    pub uid: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub panels: Vec<Panel>,
}

/// `has_data` is true iff the raw panel carried a `snapshotData` field (even an empty one).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: i64,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub panel_type: Option<String>,
    pub has_data: bool,
    pub snapshot_data: Vec<SnapshotData>,
}

/// Series payload of a panel. Variants are tried in declaration order; the first
/// structural match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotData {
    Fields(FieldSeries),
    Points(PointSeries),
    Table(TableData),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSeries {
    pub fields: Vec<SeriesField>,
    #[serde(default)]
    pub meta: Map<String, Value>,
    #[serde(default)]
    pub ref_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesField {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub config: FieldConfig,
    pub values: Vec<Option<FieldValue>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    #[serde(default)]
    pub interval: Option<i64>,
    #[serde(default, rename = "displayNameFromDS")]
    pub display_name_from_ds: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    Time,
    String,
    Table,
}

/// A single cell of a field's value column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the cell; numeric strings are accepted. `"NaN"`, `"inf"` and other
    /// non-finite values are undefined.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
        };
        v.filter(|v: &f64| v.is_finite())
    }
}

/// Legacy `[value, epoch_millis]` encoding. `alias` names the metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointSeries {
    pub datapoints: Vec<(Option<f64>, f64)>,
    pub alias: String,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableData {
    pub rows: Vec<Value>,
    pub columns: Vec<Value>,
}

/// Epoch milliseconds to an absolute UTC timestamp (sub-millisecond precision kept).
/// `None` when the value is not finite or outside the representable date range.
pub fn time_from_epoch_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    let whole = millis.floor();
    if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
        return None;
    }
    let nanos = ((millis - whole) * 1_000_000.0).round() as i64;
    DateTime::from_timestamp_millis(whole as i64)?.checked_add_signed(TimeDelta::nanoseconds(nanos))
}

// Shared test helpers: raw payload builders and validated snapshots

#![allow(dead_code)]

use perfcorr::models::Snapshot;
use perfcorr::schema;
use serde_json::{Value, json};

pub fn snapshot_payload(dashboard_title: &str, panels: Value) -> Value {
    json!({
        "dashboard": {
            "id": 11,
            "title": dashboard_title,
            "uid": "dash-uid",
            "tags": ["perf"],
            "panels": panels
        },
        "meta": {"isSnapshot": true, "version": 1, "created": "2024-03-01T12:00:00Z"}
    })
}

/// Panel with one field series: `time` + one `number` field named `metric`.
pub fn field_panel(id: i64, title: &str, metric: &str, times: &[i64], values: &[f64]) -> Value {
    json!({
        "id": id,
        "title": title,
        "type": "timeseries",
        "snapshotData": [{
            "fields": [
                {"name": "Time", "type": "time", "config": {}, "values": times},
                {"name": "Value", "type": "number", "config": {"displayNameFromDS": metric}, "values": values}
            ],
            "meta": {}
        }]
    })
}

/// Panel with one legacy point series.
pub fn point_panel(id: i64, title: &str, alias: &str, points: &[(f64, i64)]) -> Value {
    let datapoints: Vec<Value> = points.iter().map(|(v, t)| json!([v, t])).collect();
    json!({
        "id": id,
        "title": title,
        "snapshotData": [{"datapoints": datapoints, "alias": alias, "meta": {}}]
    })
}

pub fn empty_panel(id: i64, title: &str) -> Value {
    json!({"id": id, "title": title, "type": "text"})
}

pub fn snapshot(key: &str, run: &str, dashboard_title: &str, panels: Value) -> Snapshot {
    schema::validate(snapshot_payload(dashboard_title, panels), key, Some(run))
        .expect("valid snapshot")
}

// Snapshot validator: untyped JSON payload -> typed Snapshot.
// Discriminates the series encodings once so consumers can match exhaustively.
// Unknown fields are ignored everywhere.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::SchemaValidationError;
use crate::models::{Dashboard, Panel, Snapshot, SnapshotData, SnapshotMeta};

#[derive(Deserialize)]
struct DashboardHeader {
    id: i64,
    title: String,
    uid: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Deserialize)]
struct PanelHeader {
    id: i64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "type")]
    panel_type: Option<String>,
}

/// Validates one raw snapshot payload fetched under `key` (and optionally a test run).
pub fn validate(
    payload: Value,
    key: &str,
    test_run_id: Option<&str>,
) -> Result<Snapshot, SchemaValidationError> {
    let mut root = into_object(payload, "$")?;
    let meta: SnapshotMeta = from_value(take_required(&mut root, "meta", "meta")?, "meta")?;
    let dashboard = validate_dashboard(take_required(&mut root, "dashboard", "dashboard")?)?;
    Ok(Snapshot {
        key: key.to_string(),
        test_run_id: test_run_id.map(str::to_string),
        dashboard,
        meta,
    })
}

fn validate_dashboard(value: Value) -> Result<Dashboard, SchemaValidationError> {
    let mut obj = into_object(value, "dashboard")?;
    let raw_panels = obj.remove("panels");
    let header: DashboardHeader = from_value(Value::Object(obj), "dashboard")?;

    let panels = match raw_panels {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, p)| validate_panel(p, &format!("dashboard.panels[{i}]")))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(SchemaValidationError::new(
                "dashboard.panels",
                "expected an array",
            ));
        }
    };

    Ok(Dashboard {
        id: header.id,
        title: header.title,
        uid: header.uid,
        description: header.description,
        tags: header.tags,
        panels,
    })
}

fn validate_panel(value: Value, path: &str) -> Result<Panel, SchemaValidationError> {
    let mut obj = into_object(value, path)?;
    let raw_data = obj.remove("snapshotData");
    let header: PanelHeader = from_value(Value::Object(obj), path)?;

    let has_data = raw_data.is_some();
    let snapshot_data = match raw_data {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(j, item)| {
                serde_json::from_value::<SnapshotData>(item).map_err(|_| {
                    SchemaValidationError::new(
                        format!("{path}.snapshotData[{j}]"),
                        "does not match any accepted series shape (fields, datapoints, table)",
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(SchemaValidationError::new(
                format!("{path}.snapshotData"),
                "expected an array",
            ));
        }
    };

    Ok(Panel {
        id: header.id,
        title: header.title,
        panel_type: header.panel_type,
        has_data,
        snapshot_data,
    })
}

fn into_object(value: Value, path: &str) -> Result<Map<String, Value>, SchemaValidationError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(SchemaValidationError::new(path, "expected an object")),
    }
}

fn take_required(
    obj: &mut Map<String, Value>,
    field: &str,
    path: &str,
) -> Result<Value, SchemaValidationError> {
    obj.remove(field)
        .ok_or_else(|| SchemaValidationError::new(path, "missing required field"))
}

/// Deserializes a typed node; "missing field" errors get the field appended to the path.
fn from_value<T: DeserializeOwned>(value: Value, path: &str) -> Result<T, SchemaValidationError> {
    serde_json::from_value(value).map_err(|e| {
        let message = e.to_string();
        let path = match missing_field(&message) {
            Some(field) => format!("{path}.{field}"),
            None => path.to_string(),
        };
        SchemaValidationError::new(path, message)
    })
}

fn missing_field(message: &str) -> Option<&str> {
    message.strip_prefix("missing field `")?.split('`').next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(panels: Value) -> Value {
        json!({
            "dashboard": {"id": 7, "title": "JVM", "uid": "abc", "tags": [], "panels": panels},
            "meta": {"isSnapshot": true, "version": 3, "created": "2024-01-01T00:00:00Z"},
            "unexpected": {"ignored": true}
        })
    }

    #[test]
    fn panel_without_snapshot_data_has_no_data() {
        let s = validate(payload(json!([{"id": 1, "title": "t"}])), "k", Some("run")).unwrap();
        assert_eq!(s.key, "k");
        assert_eq!(s.test_run_id.as_deref(), Some("run"));
        assert!(!s.dashboard.panels[0].has_data);
    }

    #[test]
    fn empty_snapshot_data_still_counts_as_data() {
        let s = validate(payload(json!([{"id": 1, "snapshotData": []}])), "k", None).unwrap();
        assert!(s.dashboard.panels[0].has_data);
        assert!(s.dashboard.panels[0].snapshot_data.is_empty());
    }

    #[test]
    fn panel_with_series_has_data_and_reaches_the_assembler() {
        let panels = json!([{
            "id": 1,
            "title": "Heap",
            "snapshotData": [{"fields": [
                {"type": "time", "values": [1000, 2000]},
                {"type": "number", "values": [1, 2]}
            ]}]
        }]);
        let s = validate(payload(panels), "k", Some("run")).unwrap();
        assert!(s.dashboard.panels[0].has_data);
        assert_eq!(crate::assembler::assemble(&s).len(), 2);
    }

    #[test]
    fn reports_path_of_bad_series() {
        let panels = json!([
            {"id": 1, "snapshotData": []},
            {"id": 2, "snapshotData": [{"datapoints": [[1.0, 1000]], "alias": "a"}, {"bogus": 1}]}
        ]);
        let err = validate(payload(panels), "k", None).unwrap_err();
        assert_eq!(err.path, "dashboard.panels[1].snapshotData[1]");
    }

    #[test]
    fn reports_missing_dashboard_field() {
        let mut p = payload(json!([]));
        p["dashboard"].as_object_mut().unwrap().remove("uid");
        let err = validate(p, "k", None).unwrap_err();
        assert_eq!(err.path, "dashboard.uid");
    }

    #[test]
    fn reports_missing_panel_id() {
        let err = validate(payload(json!([{"title": "no id"}])), "k", None).unwrap_err();
        assert_eq!(err.path, "dashboard.panels[0].id");
    }

    #[test]
    fn rejects_non_object_payload() {
        let err = validate(json!([1, 2]), "k", None).unwrap_err();
        assert_eq!(err.path, "$");
    }

    #[test]
    fn missing_meta_is_an_error() {
        let mut p = payload(json!([]));
        p.as_object_mut().unwrap().remove("meta");
        let err = validate(p, "k", None).unwrap_err();
        assert_eq!(err.path, "meta");
    }
}

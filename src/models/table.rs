// Wide-format table and correlation matrix (the outputs handed to chart renderers).

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use super::record::serialize_seconds;

/// One aligned time row of one run; `values` is parallel to `WideTable::columns`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WideRow {
    pub time: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    #[serde(serialize_with = "serialize_seconds")]
    pub timestep: TimeDelta,
    pub test_run_id: Option<String>,
    pub key: String,
    pub dashboard_title: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WideTable {
    pub dashboard_title: String,
    /// `"panel | metric"` labels, sorted by (panel, metric).
    pub columns: Vec<String>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    pub fn empty(dashboard_title: &str) -> Self {
        Self {
            dashboard_title: dashboard_title.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, label: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(label)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }
}

/// Square, symmetric Pearson matrix. Undefined coefficients are NaN (serialized as null).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        Some(self.values[i][j])
    }
}

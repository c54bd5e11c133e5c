// Wide-format pivoter: long run table -> one row per (time, run, snapshot), one column per
// panel metric, for a single dashboard.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::{RunRecord, RunTable, WideRow, WideTable};

pub const COLUMN_SEPARATOR: &str = " | ";

type RowKey<'a> = (
    DateTime<Utc>,
    DateTime<Utc>,
    TimeDelta,
    Option<&'a str>,
    &'a str,
    &'a str,
);
type ColumnKey<'a> = (&'a str, &'a str);

/// Pivots the records of `dashboard_title`. Duplicate observations (same time, panel, metric,
/// snapshot and run) keep the first one seen; so do cells hit by two panels sharing a title.
pub fn pivot(table: &RunTable, dashboard_title: &str) -> WideTable {
    let mut seen = HashSet::new();
    let mut columns: BTreeSet<ColumnKey> = BTreeSet::new();
    let mut rows: BTreeMap<RowKey, BTreeMap<ColumnKey, Option<f64>>> = BTreeMap::new();

    for r in table
        .records
        .iter()
        .filter(|r| r.record.dashboard_title == dashboard_title)
    {
        if !seen.insert(dedup_key(r)) {
            continue;
        }
        let s = &r.record;
        let column = (
            s.record.panel_title.as_deref().unwrap_or_default(),
            s.record.metric_name.as_str(),
        );
        columns.insert(column);
        rows.entry((
            s.record.time,
            r.start_time,
            r.timestep,
            s.test_run_id.as_deref(),
            s.key.as_str(),
            s.dashboard_title.as_str(),
        ))
        .or_default()
        .entry(column)
        .or_insert(s.record.value);
    }

    let columns: Vec<ColumnKey> = columns.into_iter().collect();
    let rows = rows
        .into_iter()
        .map(|((time, start_time, timestep, run, key, title), cells)| WideRow {
            time: round_to_second(time),
            start_time,
            timestep,
            test_run_id: run.map(str::to_string),
            key: key.to_string(),
            dashboard_title: title.to_string(),
            values: columns
                .iter()
                .map(|c| cells.get(c).copied().flatten())
                .collect(),
        })
        .collect();

    WideTable {
        dashboard_title: dashboard_title.to_string(),
        columns: columns
            .iter()
            .map(|(panel, metric)| column_label(panel, metric))
            .collect(),
        rows,
    }
}

fn dedup_key(r: &RunRecord) -> (DateTime<Utc>, &str, i64, &str, Option<&str>, &str, Option<&str>) {
    let s = &r.record;
    (
        s.record.time,
        s.dashboard_title.as_str(),
        s.record.panel_id,
        s.record.metric_name.as_str(),
        s.record.panel_title.as_deref(),
        s.key.as_str(),
        s.test_run_id.as_deref(),
    )
}

/// `"panel | metric"`; empty parts are left out.
pub fn column_label(panel: &str, metric: &str) -> String {
    [panel, metric]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(COLUMN_SEPARATOR)
}

/// Nearest whole second, ties to even.
pub fn round_to_second(t: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = i64::from(t.timestamp_subsec_nanos());
    let floor = t - TimeDelta::nanoseconds(nanos);
    let round_up = nanos > 500_000_000
        || (nanos == 500_000_000 && floor.timestamp().rem_euclid(2) == 1);
    if round_up {
        floor + TimeDelta::seconds(1)
    } else {
        floor
    }
}

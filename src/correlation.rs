// Correlation engine: bucket the wide table by elapsed time, average per bucket, zero-fill,
// then a Pearson matrix over the metric columns.
//
// Order is fill -> correlate -> prune. After the zero-fill a column can still be undefined
// against everything (constant series, or fewer than two buckets); those row/column pairs
// are what the final prune removes.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::error::BucketSizeError;
use crate::models::{CorrelationMatrix, WideTable};

pub const DEFAULT_BUCKET_SIZE: &str = "10s";

const NANOS_PER_SECOND: f64 = 1e9;

/// Parses `<number><unit>` (`ms`, `s`, `min`/`m`, `h`), e.g. `10s`, `1min`, `0.5s`.
pub fn parse_bucket_size(s: &str) -> Result<TimeDelta, BucketSizeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(BucketSizeError::Empty);
    }
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let amount: f64 = number
        .parse()
        .map_err(|_| BucketSizeError::Invalid(s.to_string()))?;
    let unit_nanos: f64 = match unit.trim() {
        "ms" => 1e6,
        "s" | "sec" => 1e9,
        "m" | "min" => 60e9,
        "h" => 3600e9,
        _ => return Err(BucketSizeError::UnknownUnit(s.to_string())),
    };
    let nanos = (amount * unit_nanos).round();
    if nanos < 1.0 || !nanos.is_finite() {
        return Err(BucketSizeError::NonPositive(s.to_string()));
    }
    Ok(TimeDelta::nanoseconds(nanos as i64))
}

/// Correlates the metric columns of `wide` after bucketing by `bucket_size`.
pub fn correlate(wide: &WideTable, bucket_size: &str) -> Result<CorrelationMatrix, BucketSizeError> {
    let bucket = parse_bucket_size(bucket_size)?;
    Ok(correlate_with(wide, bucket))
}

type BucketKey<'a> = (i64, Option<&'a str>, &'a str, DateTime<Utc>);

pub fn correlate_with(wide: &WideTable, bucket: TimeDelta) -> CorrelationMatrix {
    let kept: Vec<usize> = (0..wide.columns.len())
        .filter(|&c| wide.rows.iter().any(|r| r.values[c].is_some()))
        .collect();
    if kept.is_empty() {
        return CorrelationMatrix::default();
    }

    let bucket_nanos = bucket.num_nanoseconds().unwrap_or(i64::MAX).max(1);
    let mut groups: BTreeMap<BucketKey, Vec<(f64, usize)>> = BTreeMap::new();
    for row in &wide.rows {
        let step = row.timestep.num_nanoseconds().unwrap_or(i64::MAX);
        let key = (
            step.div_euclid(bucket_nanos) * bucket_nanos,
            row.test_run_id.as_deref(),
            row.key.as_str(),
            row.start_time,
        );
        let acc = groups.entry(key).or_insert_with(|| vec![(0.0, 0); kept.len()]);
        for (slot, &c) in acc.iter_mut().zip(&kept) {
            if let Some(v) = row.values[c] {
                slot.0 += v;
                slot.1 += 1;
            }
        }
    }

    // column-major: series[c][bucket], averaged then zero-filled
    let mut series: Vec<Vec<f64>> = vec![Vec::with_capacity(groups.len()); kept.len()];
    for acc in groups.values() {
        for (c, &(sum, count)) in acc.iter().enumerate() {
            series[c].push(if count == 0 { 0.0 } else { sum / count as f64 });
        }
    }
    debug!(
        dashboard = %wide.dashboard_title,
        buckets = groups.len(),
        columns = kept.len(),
        bucket_secs = bucket_nanos as f64 / NANOS_PER_SECOND,
        "bucketed wide table"
    );

    let n = kept.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = if i == j {
                if is_degenerate(&series[i]) { f64::NAN } else { 1.0 }
            } else {
                pearson(&series[i], &series[j])
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    let labels: Vec<String> = kept.iter().map(|&c| wide.columns[c].clone()).collect();
    prune_undefined(CorrelationMatrix { labels, values })
}

/// Removes every row/column pair whose row is entirely NaN.
fn prune_undefined(matrix: CorrelationMatrix) -> CorrelationMatrix {
    let keep: Vec<usize> = (0..matrix.len())
        .filter(|&i| matrix.values[i].iter().any(|v| !v.is_nan()))
        .collect();
    CorrelationMatrix {
        labels: keep.iter().map(|&i| matrix.labels[i].clone()).collect(),
        values: keep
            .iter()
            .map(|&i| keep.iter().map(|&j| matrix.values[i][j]).collect())
            .collect(),
    }
}

/// Fewer than two points or no variation: correlation is undefined.
fn is_degenerate(x: &[f64]) -> bool {
    x.len() < 2 || x.iter().any(|v| !v.is_finite()) || x.iter().all(|v| *v == x[0])
}

/// Pearson correlation coefficient; NaN when undefined.
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || is_degenerate(x) || is_degenerate(y) {
        return f64::NAN;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return f64::NAN;
    }
    (cov / denom).clamp(-1.0, 1.0)
}

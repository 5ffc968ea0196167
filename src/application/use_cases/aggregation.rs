// ============================================================
// AGGREGATION PIPELINE
// ============================================================
// Pure computation of KPIs, time buckets and dimension rankings
// from (rows, columns, selection). Never errors on malformed data.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::analytics::{AggregationResult, DimensionSlice, Kpi, TimeSeriesPoint};
use crate::domain::dataset::{CellValue, ColumnDescriptor, Row, Selection};

use super::schema_classifier::metric_columns;
use super::type_inference::parse_number;

/// How many metric columns get a KPI card.
const KPI_METRIC_LIMIT: usize = 3;

/// How many dimension groups survive the ranking.
const BREAKDOWN_LIMIT: usize = 10;

/// Computes the full dashboard payload for one selection.
///
/// Pure and total: identical inputs always produce an identical result,
/// and malformed or missing values degrade to zero/empty instead of
/// erroring. The result is freshly allocated per call.
pub fn aggregate(
    rows: &[Row],
    columns: &[ColumnDescriptor],
    selection: &Selection,
) -> AggregationResult {
    AggregationResult {
        kpis: compute_kpis(rows, columns),
        time_series: compute_time_series(rows, selection),
        dimension_breakdown: compute_dimension_breakdown(rows, selection),
    }
}

/// Maps any cell to a number for accumulation. Non-numeric, date-typed
/// and missing values all count as zero.
fn coerce_number(cell: Option<&CellValue>) -> f64 {
    match cell {
        Some(CellValue::Number(n)) => *n,
        Some(CellValue::Text(s)) => parse_number(s).unwrap_or(0.0),
        Some(CellValue::Date(_)) | Some(CellValue::Null) | None => 0.0,
    }
}

/// "total_revenue" -> "Total Revenue".
pub fn display_name(raw: &str) -> String {
    let spaced = raw.replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut prev: Option<char> = None;
    for c in spaced.chars() {
        let at_word_start = prev.map_or(true, |p| !p.is_alphanumeric());
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

fn compute_kpis(rows: &[Row], columns: &[ColumnDescriptor]) -> Vec<Kpi> {
    // Empty dataset: no KPIs, and no division by zero anywhere below.
    if rows.is_empty() {
        return Vec::new();
    }

    metric_columns(columns)
        .into_iter()
        .take(KPI_METRIC_LIMIT)
        .map(|col| {
            let values: Vec<f64> = rows
                .iter()
                .map(|row| coerce_number(row.get(&col.name)))
                .collect();

            let total: f64 = values.iter().sum();
            let average = total / values.len() as f64;

            let trend = if values.len() > 1 {
                let first = values[0];
                let last = values[values.len() - 1];
                if first == 0.0 {
                    // Zero baseline: report a flat trend instead of
                    // propagating a non-finite percentage.
                    0.0
                } else {
                    let pct = (last - first) / first * 100.0;
                    if pct.is_finite() { pct } else { 0.0 }
                }
            } else {
                0.0
            };

            Kpi {
                name: display_name(&col.name),
                total,
                average,
                trend,
            }
        })
        .collect()
}

/// Renders a cell into its grouping key. Values are compared exactly, not
/// normalized: two spellings of the same date form separate buckets.
fn cell_key(cell: Option<&CellValue>) -> String {
    match cell {
        Some(CellValue::Text(s)) => s.clone(),
        Some(CellValue::Number(n)) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        Some(CellValue::Date(d)) => d.format("%Y-%m-%d").to_string(),
        Some(CellValue::Null) | None => String::new(),
    }
}

/// Best-effort parse of a bucket key into a sortable timestamp.
fn parse_time_key(key: &str) -> Option<i64> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.and_utc().timestamp());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc().timestamp());
        }
    }
    None
}

fn compute_time_series(rows: &[Row], selection: &Selection) -> Vec<TimeSeriesPoint> {
    if selection.time_column.is_empty() || selection.metric.is_empty() {
        return Vec::new();
    }

    let mut order: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<TimeSeriesPoint> = Vec::new();

    for row in rows {
        let key = cell_key(row.get(&selection.time_column));
        let idx = *order.entry(key.clone()).or_insert_with(|| {
            buckets.push(TimeSeriesPoint {
                time: key,
                value: 0.0,
                count: 0,
            });
            buckets.len() - 1
        });
        buckets[idx].value += coerce_number(row.get(&selection.metric));
        buckets[idx].count += 1;
    }

    // Stable sort: parseable keys ascend chronologically; unparseable
    // keys keep first-appearance order after them. Best-effort only.
    buckets.sort_by(|a, b| match (parse_time_key(&a.time), parse_time_key(&b.time)) {
        (Some(ta), Some(tb)) => ta.cmp(&tb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    buckets
}

fn compute_dimension_breakdown(rows: &[Row], selection: &Selection) -> Vec<DimensionSlice> {
    if selection.dimension.is_empty() || selection.metric.is_empty() {
        return Vec::new();
    }

    let mut order: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<DimensionSlice> = Vec::new();

    for row in rows {
        let key = cell_key(row.get(&selection.dimension));
        let idx = *order.entry(key.clone()).or_insert_with(|| {
            groups.push(DimensionSlice {
                name: key,
                value: 0.0,
            });
            groups.len() - 1
        });
        groups[idx].value += coerce_number(row.get(&selection.metric));
    }

    // Stable descending sort; ties keep first-encountered-group order.
    groups.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    groups.truncate(BREAKDOWN_LIMIT);
    groups
}

// ============================================================
// ANALYTICS RESULT TYPES
// ============================================================
// Derived dashboard values, rebuilt from scratch on every selection change

use serde::{Deserialize, Serialize};

/// Summary statistics for one metric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    /// Display name: underscores become spaces, words are title-cased.
    pub name: String,
    pub total: f64,
    pub average: f64,
    /// Percent change from the first row's value to the last row's.
    /// Always finite: a zero baseline reports 0 instead of infinity.
    pub trend: f64,
}

/// One time bucket: all rows sharing an exact time-column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub time: String,
    pub value: f64,
    pub count: usize,
}

/// One dimension group, ranked by accumulated metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSlice {
    pub name: String,
    pub value: f64,
}

/// The full dashboard payload for one (rows, columns, selection) triple.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub kpis: Vec<Kpi>,
    pub time_series: Vec<TimeSeriesPoint>,
    pub dimension_breakdown: Vec<DimensionSlice>,
}

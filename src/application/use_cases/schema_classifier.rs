// ============================================================
// SCHEMA CLASSIFIER
// ============================================================
// Derive per-column metadata from a dataset's first row

use crate::domain::dataset::{ColumnDescriptor, Row, Selection};

use super::type_inference::infer_cell;

/// Classifies columns from the first row of a dataset.
///
/// One descriptor per key of the first row, in that row's key order.
/// Later rows are never consulted; a value with a different type under
/// the same key further down is silently miscategorized. That is a
/// deliberate simplification carried over from the ingestion contract.
/// An empty dataset yields an empty column list.
pub fn classify_columns(rows: &[Row]) -> Vec<ColumnDescriptor> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    first
        .iter()
        .map(|(name, value)| ColumnDescriptor::new(name, infer_cell(value)))
        .collect()
}

/// Metric picker entries: numeric columns with a usable name.
pub fn metric_columns(columns: &[ColumnDescriptor]) -> Vec<&ColumnDescriptor> {
    columns
        .iter()
        .filter(|c| c.is_metric && c.is_selectable())
        .collect()
}

/// Dimension picker entries: text columns with a usable name.
pub fn dimension_columns(columns: &[ColumnDescriptor]) -> Vec<&ColumnDescriptor> {
    columns
        .iter()
        .filter(|c| c.is_dimension && c.is_selectable())
        .collect()
}

/// Time-axis picker entries: date-typed or "date"-named columns.
pub fn temporal_columns(columns: &[ColumnDescriptor]) -> Vec<&ColumnDescriptor> {
    columns
        .iter()
        .filter(|c| c.is_temporal_eligible() && c.is_selectable())
        .collect()
}

/// Default selection: the first eligible column of each kind, or empty
/// when none exists.
pub fn default_selection(columns: &[ColumnDescriptor]) -> Selection {
    Selection {
        dimension: dimension_columns(columns)
            .first()
            .map(|c| c.name.clone())
            .unwrap_or_default(),
        metric: metric_columns(columns)
            .first()
            .map(|c| c.name.clone())
            .unwrap_or_default(),
        time_column: temporal_columns(columns)
            .first()
            .map(|c| c.name.clone())
            .unwrap_or_default(),
    }
}

/// Fills any empty slot of `selection` with the default for that slot.
pub fn resolve_selection(columns: &[ColumnDescriptor], selection: Selection) -> Selection {
    let defaults = default_selection(columns);
    Selection {
        dimension: if selection.dimension.is_empty() {
            defaults.dimension
        } else {
            selection.dimension
        },
        metric: if selection.metric.is_empty() {
            defaults.metric
        } else {
            selection.metric
        },
        time_column: if selection.time_column.is_empty() {
            defaults.time_column
        } else {
            selection.time_column
        },
    }
}

// ============================================================
// TYPE INFERENCE
// ============================================================
// Semantic type of a single sample value

use crate::domain::dataset::{CellValue, ColumnType};

/// Infers the semantic type of an already-typed cell.
///
/// Only values that are genuinely numeric or genuinely date-typed get
/// those types; everything else (including nulls) is text. Raw CSV text
/// never produces a `Date` here, by design: string dates are
/// indistinguishable from text at this layer and are picked up by the
/// column-name heuristic in the classifier instead.
pub fn infer_cell(value: &CellValue) -> ColumnType {
    match value {
        CellValue::Number(_) => ColumnType::Number,
        CellValue::Date(_) => ColumnType::Date,
        CellValue::Text(_) | CellValue::Null => ColumnType::Text,
    }
}

/// Strict numeric parse for raw text fields.
///
/// Accepts what fully parses as a finite decimal (optional single leading
/// sign, scientific notation allowed). Rejects the empty string, trailing
/// garbage, and the textual non-finite spellings (`inf`, `nan`) that
/// `f64::from_str` would otherwise let through.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converts a raw CSV field into its typed cell: numeric when it fully
/// parses as a finite number, trimmed text otherwise.
pub fn cell_from_text(raw: &str) -> CellValue {
    match parse_number(raw) {
        Some(n) => CellValue::Number(n),
        None => CellValue::Text(raw.trim().to_string()),
    }
}

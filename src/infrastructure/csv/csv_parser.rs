// ============================================================
// CSV PARSER
// ============================================================
// Naive delimited-text parsing into row mappings.
//
// Known limitations, kept on purpose and asserted by the tests:
// no quoted-field support (a comma inside quotes splits the field),
// and duplicate headers overwrite earlier values within each row.

use crate::domain::dataset::Row;
use crate::domain::error::{AppError, Result};

use crate::application::use_cases::type_inference::cell_from_text;

/// Line-and-comma CSV parser.
pub struct CsvParser;

impl CsvParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses raw CSV text into rows.
    ///
    /// The first non-blank line is the header; its trimmed tokens become
    /// row keys verbatim. Each field is numeric-coerced when it fully
    /// parses as a finite number, otherwise stored as trimmed text. Rows
    /// shorter than the header leave the trailing keys absent. A header
    /// with zero data lines is a valid empty dataset; input with zero
    /// non-blank lines is a `ParseError`.
    pub fn parse(&self, raw: &str) -> Result<Vec<Row>> {
        let mut lines = raw
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty());

        let header_line = lines.next().ok_or_else(|| {
            AppError::ParseError("CSV input contains no header line".to_string())
        })?;

        let headers: Vec<String> = header_line.split(',').map(|h| h.trim().to_string()).collect();

        let rows = lines
            .map(|line| {
                let values: Vec<&str> = line.split(',').map(str::trim).collect();
                let mut row = Row::new();
                for (idx, header) in headers.iter().enumerate() {
                    let Some(value) = values.get(idx) else {
                        // Short row: key absent, reads as null downstream.
                        continue;
                    };
                    row.insert(header.clone(), cell_from_text(value));
                }
                row
            })
            .collect();

        Ok(rows)
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

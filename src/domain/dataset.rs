// ============================================================
// DATASET TYPES
// ============================================================
// Data structures for schema-free tabular datasets

use chrono::NaiveDate;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single cell in a dataset row.
///
/// JSON input only ever produces `Number`, `Text` or `Null`; the `Date`
/// variant exists for datasets seeded in-process with real date values.
/// CSV-sourced date columns therefore arrive as `Text` and are picked up
/// as time axes through the column-name heuristic, not the cell type.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Null,
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            // Integral values emit as JSON integers so that 1200 does
            // not come back as "1200.0" after a storage round trip.
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 9e15 => {
                serializer.serialize_i64(*n as i64)
            }
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Text(s) => serializer.serialize_str(s),
            // Dates round-trip as ISO strings; the date type is not
            // recoverable from storage (matches the CSV/text asymmetry).
            CellValue::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            CellValue::Null => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CellVisitor;

        impl<'de> Visitor<'de> for CellVisitor {
            type Value = CellValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number, string, boolean or null")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<CellValue, E> {
                Ok(CellValue::Number(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<CellValue, E> {
                Ok(CellValue::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<CellValue, E> {
                Ok(CellValue::Number(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<CellValue, E> {
                Ok(CellValue::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<CellValue, E> {
                Ok(CellValue::Text(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<CellValue, E> {
                Ok(CellValue::Text(v.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<CellValue, E> {
                Ok(CellValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> std::result::Result<CellValue, E> {
                Ok(CellValue::Null)
            }
        }

        deserializer.deserialize_any(CellVisitor)
    }
}

/// A row: an insertion-ordered mapping from column name to cell value.
///
/// Inserting an existing key overwrites the value but keeps the key's
/// original position, which is what makes duplicate CSV headers behave
/// as last-value-wins. A key absent from a row reads as `Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: CellValue) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, CellValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object of column values")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Row, A::Error> {
                let mut row = Row::new();
                while let Some((key, value)) = access.next_entry::<String, CellValue>()? {
                    row.insert(key, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// Semantic type of a column, inferred from its first-row sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    Date,
    Text,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Text => "text",
        }
    }

    pub fn parse(s: &str) -> Option<ColumnType> {
        match s {
            "number" => Some(ColumnType::Number),
            "date" => Some(ColumnType::Date),
            "text" => Some(ColumnType::Text),
            _ => None,
        }
    }
}

/// Per-column metadata derived once at ingestion time.
///
/// Invariant: `is_metric == (column_type == Number)` and
/// `is_dimension == (column_type == Text)`; a date column has both false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: ColumnType,
    pub is_metric: bool,
    pub is_dimension: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            is_metric: column_type == ColumnType::Number,
            is_dimension: column_type == ColumnType::Text,
        }
    }

    /// Whitespace-named columns stay in the descriptor list for row
    /// bookkeeping but never appear in a selectable picker.
    pub fn is_selectable(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Usable as a time axis: declared date type, or "date" appears in
    /// the column name. Derived, never stored, so it cannot drift from
    /// the descriptor.
    pub fn is_temporal_eligible(&self) -> bool {
        self.column_type == ColumnType::Date || self.name.to_lowercase().contains("date")
    }
}

/// Dataset metadata as persisted alongside the rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMeta {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub category: String,
    pub row_count: usize,
    pub column_count: usize,
    pub created_at: Option<String>,
}

/// A fully loaded dataset: metadata, derived columns and raw rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub dataset: DatasetMeta,
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Row>,
}

/// The user's current dashboard choice. An empty string means
/// "no selection" for that slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(default)]
    pub dimension: String,
    #[serde(default)]
    pub metric: String,
    #[serde(default, alias = "time_column")]
    pub time_column: String,
}
